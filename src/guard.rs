use std::sync::Arc;

use bevy_ecs::resource::Resource;

use crate::alliance::{self, AllianceCommand, AllianceRegistry};
use crate::config::GuardConfig;
use crate::gate::{DamageEvent, DamageGate, DamageVerdict};
use crate::host::HostWorld;
use crate::id::{PlayerId, StructureId};
use crate::protection::ProtectionTracker;
use crate::raid::{BreachOutcome, PollReport, RaidMonitor};

/// Entry point for every host event.
///
/// Cheap to clone: all stores are shared handles, so the scheduler tick and
/// the host's damage pass can hold their own copy.
#[derive(Resource, Clone)]
pub struct RaidGuard {
    config: Arc<GuardConfig>,
    host: Arc<dyn HostWorld>,
    alliances: Arc<AllianceRegistry>,
    raids: Arc<RaidMonitor>,
    protection: Arc<ProtectionTracker>,
}

impl RaidGuard {
    pub fn new(
        host: Arc<dyn HostWorld>,
        config: GuardConfig,
        alliances: Arc<AllianceRegistry>,
    ) -> Self {
        let config = config.validated();
        Self {
            raids: Arc::new(RaidMonitor::new(&config)),
            protection: Arc::new(ProtectionTracker::new()),
            config: Arc::new(config),
            host,
            alliances,
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn host(&self) -> &dyn HostWorld {
        self.host.as_ref()
    }

    pub fn alliances(&self) -> &AllianceRegistry {
        &self.alliances
    }

    pub fn raids(&self) -> &RaidMonitor {
        &self.raids
    }

    pub fn protection(&self) -> &ProtectionTracker {
        &self.protection
    }

    // -- Host events --------------------------------------------------------

    /// Only engine-made breaches start monitoring, and only with raid guarding
    /// switched on.
    pub fn on_siege_breached(
        &self,
        attacker: PlayerId,
        structure: StructureId,
        via_engine: bool,
    ) -> BreachOutcome {
        if !self.config.raid_guard || !via_engine {
            return BreachOutcome::Ignored;
        }
        self.raids
            .on_siege_breached(self.host(), &self.alliances, attacker, structure)
    }

    pub fn on_damage_event(&self, event: &DamageEvent) -> DamageVerdict {
        self.gate().assess(event)
    }

    pub fn on_player_connected(&self, player: PlayerId) -> bool {
        self.alliances.on_player_connected(player)
    }

    pub fn execute_command(&self, caller: PlayerId, command: &AllianceCommand) -> String {
        alliance::execute(&self.alliances, self.host(), caller, command)
    }

    /// One scheduler step of the raid monitor.
    pub fn poll(&self) -> PollReport {
        self.raids.poll(self.host(), self.config.units_per_tick)
    }

    fn gate(&self) -> DamageGate<'_> {
        DamageGate {
            config: &self.config,
            host: self.host(),
            alliances: &self.alliances,
            raids: &self.raids,
            protection: &self.protection,
        }
    }
}
