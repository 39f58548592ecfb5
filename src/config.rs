use std::path::PathBuf;

use serde::Deserialize;

/// Feature switches and limits for raid guarding, alliances and engine
/// protection. Loading this from a file is the host's concern; every field
/// has a default so a partial document deserializes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Start monitoring territories when a breach is detected.
    pub raid_guard: bool,
    /// Allow players to form alliances.
    pub alliances: bool,
    /// Clan leaders decide alliance membership for their whole clan.
    pub clan_based_alliances: bool,
    /// Veto damage between members of the same alliance.
    pub prevent_friendly_fire: bool,
    /// Alliance cap. In clan mode the founder and their clan-mates do not count.
    pub max_alliance_size: usize,
    /// Cap how many allowed defenders/raiders may be on site at once.
    pub limit_assists: bool,
    /// Concurrent assist limit per side when `limit_assists` is set.
    pub alliance_assists: usize,
    /// Once counted, a participant keeps their assist slot for the whole raid.
    pub lock_participants: bool,
    /// Veto damage dealt to raid participants by players outside the raid.
    pub block_outside_damage: bool,
    /// Temporarily protect siege engines from outside interference.
    pub golem_guard: bool,
    /// Protection granted per engine hit before the breach.
    pub golem_attack_protection_secs: u64,
    /// Protection granted per engine hit once the raid is underway.
    pub golem_breached_protection_secs: u64,
    /// Monitor work units (player × session) processed per scheduler tick.
    pub units_per_tick: usize,
    /// Directory holding `player_alliances.json` and `player_bools.json`.
    pub data_dir: PathBuf,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            raid_guard: false,
            alliances: false,
            clan_based_alliances: false,
            prevent_friendly_fire: false,
            max_alliance_size: 4,
            limit_assists: false,
            alliance_assists: 4,
            lock_participants: false,
            block_outside_damage: false,
            golem_guard: false,
            golem_attack_protection_secs: 15,
            golem_breached_protection_secs: 60,
            units_per_tick: 64,
            data_dir: PathBuf::from("Alliances"),
        }
    }
}

impl GuardConfig {
    /// Clamp limits that would make the guard unusable to at least 1.
    pub fn validated(mut self) -> Self {
        self.max_alliance_size = self.max_alliance_size.max(1);
        self.alliance_assists = self.alliance_assists.max(1);
        self.units_per_tick = self.units_per_tick.max(1);
        self
    }

    pub fn clan_mode(&self) -> bool {
        self.alliances && self.clan_based_alliances
    }
}
