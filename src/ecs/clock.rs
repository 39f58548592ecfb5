use bevy_ecs::resource::Resource;
use bevy_ecs::system::{Res, ResMut};

use crate::guard::RaidGuard;
use crate::time::ServerTime;

/// Guard clock resource: how many ticks ran and the host time seen last.
///
/// The `advance_clock` system updates it at the end of each tick (in
/// `GuardPhase::Last`), so systems see the previous tick's time.
#[derive(Resource, Debug, Default)]
pub struct GuardClock {
    pub last_seen: ServerTime,
    pub tick_count: u64,
}

impl GuardClock {
    pub fn advance(&mut self, now: ServerTime) {
        self.last_seen = now;
        self.tick_count += 1;
    }
}

/// Bevy system that records the host time at the end of a tick.
pub fn advance_clock(mut clock: ResMut<GuardClock>, guard: Res<RaidGuard>) {
    clock.advance(guard.host().server_time());
}
