use bevy_app::App;
use bevy_ecs::message::Messages;

use crate::ecs::events::{PlayerConnected, SiegeBreached};
use crate::ecs::schedule::GuardTick;
use crate::id::{PlayerId, StructureId};

/// Run `n` guard ticks.
pub fn tick(app: &mut App, n: u32) {
    for _ in 0..n {
        app.world_mut().run_schedule(GuardTick);
    }
}

/// Queue an engine-made breach for the next tick.
pub fn breach(app: &mut App, attacker: PlayerId, structure: StructureId) {
    app.world_mut()
        .resource_mut::<Messages<SiegeBreached>>()
        .write(SiegeBreached {
            attacker,
            structure,
            via_engine: true,
        });
}

/// Queue a connection for the next tick.
pub fn connect(app: &mut App, player: PlayerId) {
    app.world_mut()
        .resource_mut::<Messages<PlayerConnected>>()
        .write(PlayerConnected { player });
}
