pub mod json;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub use json::JsonStore;

use crate::id::PlayerId;

pub const ALLIANCES_FILE: &str = "player_alliances.json";
pub const PLAYER_BOOLS_FILE: &str = "player_bools.json";

/// Key of the "open to being recruited" flag in the player-bool bag.
pub const RECRUITABLE: &str = "Grouping";

/// Owner identity → member display names.
pub type AllianceMap = BTreeMap<PlayerId, BTreeSet<String>>;

/// Player identity → named booleans.
pub type PlayerBools = BTreeMap<PlayerId, BTreeMap<String, bool>>;

/// The two documents backing the alliance registry.
#[derive(Debug, Clone)]
pub struct AllianceStores {
    pub alliances: JsonStore<AllianceMap>,
    pub bools: JsonStore<PlayerBools>,
}

impl AllianceStores {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            alliances: JsonStore::new(dir.join(ALLIANCES_FILE)),
            bools: JsonStore::new(dir.join(PLAYER_BOOLS_FILE)),
        }
    }
}
