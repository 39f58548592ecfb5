#![allow(dead_code)]

use std::sync::Arc;

use raid_guard::testutil::{FakeHost, Territory};
use raid_guard::{AllianceRegistry, ClanId, GuardConfig, PlayerId, RaidGuard, StructureId};

/// A castle, its owner's clan and a raiding clan.
pub struct Siege {
    pub host: Arc<FakeHost>,
    pub guard: RaidGuard,
    pub castle: StructureId,
    pub territory: Territory,
    pub home: ClanId,
    pub away: ClanId,
    pub owner: PlayerId,
    pub raider: PlayerId,
}

pub fn siege(config: GuardConfig) -> Siege {
    let host = Arc::new(FakeHost::new());
    let home = host.add_clan(10, "Home");
    let away = host.add_clan(20, "Away");
    let owner = host.add_player(1, "Owner", Some(home));
    let raider = host.add_player(2, "Raider", Some(away));
    let territory = Territory::new((0, 0), (20, 20));
    let castle = host.add_structure(100, owner, territory);
    let registry = Arc::new(AllianceRegistry::in_memory(&config));
    let guard = RaidGuard::new(host.clone(), config, registry);
    Siege {
        host,
        guard,
        castle,
        territory,
        home,
        away,
        owner,
        raider,
    }
}

pub fn raid_config() -> GuardConfig {
    GuardConfig {
        raid_guard: true,
        ..GuardConfig::default()
    }
}

/// Poll until the current sweep completes.
pub fn sweep(guard: &RaidGuard) {
    for _ in 0..64 {
        if guard.poll().sweep_completed || !guard.raids().is_running() {
            return;
        }
    }
    panic!("sweep did not complete");
}
