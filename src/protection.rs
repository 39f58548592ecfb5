//! Temporary protection for siege engines against outside interference.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use crate::id::{EngineId, PlayerId};
use crate::time::ServerTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GolemProtection {
    pub protected_until: ServerTime,
    /// Players who may still damage the engine.
    pub exempt: HashSet<PlayerId>,
}

#[derive(Debug, Default)]
pub struct ProtectionTracker {
    entries: Mutex<HashMap<EngineId, GolemProtection>>,
}

impl ProtectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Protect `engine` for `secs` from `now`. A refresh replaces both the
    /// deadline and the exemption set.
    pub fn grant(
        &self,
        engine: EngineId,
        now: ServerTime,
        secs: u64,
        exempt: impl IntoIterator<Item = PlayerId>,
    ) {
        let protection = GolemProtection {
            protected_until: now.plus_secs(secs),
            exempt: exempt.into_iter().collect(),
        };
        tracing::debug!("engine {engine} protected until {}", protection.protected_until);
        self.entries.lock().insert(engine, protection);
    }

    pub fn is_protected(&self, engine: EngineId, attacker: PlayerId, now: ServerTime) -> bool {
        self.entries
            .lock()
            .get(&engine)
            .is_some_and(|p| now < p.protected_until && !p.exempt.contains(&attacker))
    }

    pub fn get(&self, engine: EngineId) -> Option<GolemProtection> {
        self.entries.lock().get(&engine).cloned()
    }
}
