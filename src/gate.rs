//! Veto decisions for damage events reported by the host.

use crate::alliance::AllianceRegistry;
use crate::config::GuardConfig;
use crate::host::HostWorld;
use crate::id::{EngineId, PlayerId, StructureId};
use crate::protection::ProtectionTracker;
use crate::raid::{RaidMonitor, allow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageKind {
    Physical,
    Spell,
    /// Environment, status ticks and anything else the host reports.
    Other,
}

impl DamageKind {
    pub fn is_gated(self) -> bool {
        matches!(self, DamageKind::Physical | DamageKind::Spell)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageTarget {
    /// A player's character, and the siege engine they operate, if any.
    Player {
        id: PlayerId,
        engine: Option<EngineId>,
    },
    Structure(StructureId),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageEvent {
    pub attacker: PlayerId,
    /// The siege engine the attacker is operating, if any.
    pub attacker_engine: Option<EngineId>,
    pub target: DamageTarget,
    pub kind: DamageKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VetoReason {
    ProtectedEngine,
    ThirdParty,
    FriendlyFire,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageVerdict {
    Allow,
    Veto(VetoReason),
}

impl DamageVerdict {
    pub fn is_veto(self) -> bool {
        matches!(self, DamageVerdict::Veto(_))
    }
}

/// Borrowed view over the guard's stores for one damage pass.
pub struct DamageGate<'a> {
    pub config: &'a GuardConfig,
    pub host: &'a dyn HostWorld,
    pub alliances: &'a AllianceRegistry,
    pub raids: &'a RaidMonitor,
    pub protection: &'a ProtectionTracker,
}

impl DamageGate<'_> {
    /// Decide one event. Engine hits refresh protection first; the first
    /// predicate that vetoes wins.
    pub fn assess(&self, event: &DamageEvent) -> DamageVerdict {
        if !event.kind.is_gated() {
            return DamageVerdict::Allow;
        }
        self.refresh_engine(event);

        let reason = self
            .protected_engine(event)
            .or_else(|| self.third_party(event))
            .or_else(|| self.friendly_fire(event));
        match reason {
            Some(reason) => {
                tracing::debug!("vetoed damage by player {}: {reason:?}", event.attacker);
                DamageVerdict::Veto(reason)
            }
            None => DamageVerdict::Allow,
        }
    }

    /// A hit dealt from a siege engine renews that engine's protection. While
    /// the operator raids, the defenders of that raid stay exempt. Before the
    /// breach only a hit on a structure counts, and its owner's side is exempt.
    fn refresh_engine(&self, event: &DamageEvent) {
        if !self.config.golem_guard {
            return;
        }
        let Some(engine) = event.attacker_engine else {
            return;
        };
        let now = self.host.server_time();

        if let Some(structure) = self.raids.raid_of(event.attacker) {
            let defenders = self.raids.defenders_of(structure).unwrap_or_default();
            self.protection.grant(
                engine,
                now,
                self.config.golem_breached_protection_secs,
                defenders,
            );
            return;
        }

        let DamageTarget::Structure(structure) = event.target else {
            return;
        };
        if let Some(owner) = self.host.structure_owner(structure) {
            let defenders =
                allow::defender_roster(self.host, self.alliances, self.config.alliances, owner);
            self.protection.grant(
                engine,
                now,
                self.config.golem_attack_protection_secs,
                defenders,
            );
        }
    }

    fn protected_engine(&self, event: &DamageEvent) -> Option<VetoReason> {
        if !self.config.golem_guard {
            return None;
        }
        let DamageTarget::Player {
            engine: Some(engine),
            ..
        } = event.target
        else {
            return None;
        };
        self.protection
            .is_protected(engine, event.attacker, self.host.server_time())
            .then_some(VetoReason::ProtectedEngine)
    }

    fn third_party(&self, event: &DamageEvent) -> Option<VetoReason> {
        if !self.config.block_outside_damage {
            return None;
        }
        let DamageTarget::Player { id, .. } = event.target else {
            return None;
        };
        self.raids
            .interference(id, event.attacker)
            .then_some(VetoReason::ThirdParty)
    }

    fn friendly_fire(&self, event: &DamageEvent) -> Option<VetoReason> {
        if !(self.config.prevent_friendly_fire && self.config.alliances) {
            return None;
        }
        let DamageTarget::Player { id, .. } = event.target else {
            return None;
        };
        if id == event.attacker {
            return None;
        }
        let attacker = self.host.player(event.attacker)?;
        let target = self.host.player(id)?;
        self.alliances
            .are_allied(&attacker.name, &target.name)
            .then_some(VetoReason::FriendlyFire)
    }
}
