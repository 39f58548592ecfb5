//! Ingest systems (Ingest phase): apply host-written messages to the guard.
//!
//! Connections run before breaches so a player who connects and breaches in
//! the same frame already has a flag bag.

use bevy_app::{App, Plugin};
use bevy_ecs::message::MessageReader;
use bevy_ecs::schedule::IntoScheduleConfigs;
use bevy_ecs::system::Res;

use crate::ecs::events::{PlayerConnected, SiegeBreached};
use crate::ecs::schedule::{GuardPhase, GuardTick};
use crate::guard::RaidGuard;

pub struct IngestPlugin;

impl Plugin for IngestPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            GuardTick,
            (ingest_connections, ingest_breaches)
                .chain()
                .in_set(GuardPhase::Ingest),
        );
    }
}

fn ingest_connections(mut events: MessageReader<PlayerConnected>, guard: Res<RaidGuard>) {
    for event in events.read() {
        guard.on_player_connected(event.player);
    }
}

fn ingest_breaches(mut events: MessageReader<SiegeBreached>, guard: Res<RaidGuard>) {
    for event in events.read() {
        let outcome = guard.on_siege_breached(event.attacker, event.structure, event.via_engine);
        tracing::debug!(
            "breach on structure {} by player {}: {outcome:?}",
            event.structure,
            event.attacker
        );
    }
}
