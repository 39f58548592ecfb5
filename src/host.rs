//! Contract between the guard and the game server hosting it.
//!
//! The host owns entity storage, spatial queries, clans and status effects.
//! The core only ever holds identity tokens and re-resolves them here on every
//! use, so a player who disconnects or a structure that is destroyed simply
//! stops resolving.

use crate::error::HostError;
use crate::id::{ClanId, PlayerId, StructureId};
use crate::time::ServerTime;

/// Tile coordinates of a player's character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A resolved player record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInfo {
    pub id: PlayerId,
    /// Character display name, as stored in alliance member sets.
    pub name: String,
    pub clan: Option<ClanId>,
}

/// Debuff parameters used to punish unauthorized presence in a raided
/// territory: blocks all incoming healing and burns the target each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PunitiveEffect {
    pub duration_secs: f32,
    /// Multiplier applied to the debuff's per-tick damage.
    pub damage_multiplier: f32,
    /// Fraction of incoming healing blocked (1.0 = all).
    pub heal_block: f32,
}

impl Default for PunitiveEffect {
    fn default() -> Self {
        Self {
            duration_secs: 60.0,
            damage_multiplier: 3.0,
            heal_block: 1.0,
        }
    }
}

/// Everything the guard needs from the game server.
///
/// Implementations must be callable from both the scheduler tick and the
/// host's damage pass.
pub trait HostWorld: Send + Sync {
    fn server_time(&self) -> ServerTime;

    /// Players currently connected, in host iteration order.
    fn connected_players(&self) -> Vec<PlayerId>;

    fn player(&self, id: PlayerId) -> Option<PlayerInfo>;

    /// Resolve a character name typed by a player (case-insensitive).
    fn find_player(&self, name: &str) -> Option<PlayerInfo>;

    /// Resolve a clan by its name (case-insensitive).
    fn find_clan(&self, name: &str) -> Option<ClanId>;

    fn clan_name(&self, clan: ClanId) -> Option<String>;

    /// Clan members in roster order.
    fn clan_roster(&self, clan: ClanId) -> Vec<PlayerId>;

    /// Index into [`clan_roster`](Self::clan_roster) of the clan leader.
    fn clan_leader_index(&self, clan: ClanId) -> Option<usize>;

    /// Current tile of a connected player's character. `None` when the
    /// character cannot be resolved this tick.
    fn position(&self, player: PlayerId) -> Option<Position>;

    fn is_in_territory(&self, position: Position, structure: StructureId) -> bool;

    fn is_structure_under_siege(&self, structure: StructureId) -> bool;

    /// Player owning the structure's territory.
    fn structure_owner(&self, structure: StructureId) -> Option<PlayerId>;

    fn has_punitive_effect(&self, player: PlayerId) -> bool;

    fn apply_punitive_effect(
        &self,
        player: PlayerId,
        effect: &PunitiveEffect,
    ) -> Result<(), HostError>;

    fn send_message(&self, player: PlayerId, text: &str) -> Result<(), HostError>;

    /// Whether `player` leads their clan. Players without a clan lead nothing.
    fn is_clan_leader(&self, player: PlayerId) -> bool {
        let Some(clan) = self.player(player).and_then(|info| info.clan) else {
            return false;
        };
        let roster = self.clan_roster(clan);
        self.clan_leader_index(clan)
            .and_then(|index| roster.get(index).copied())
            == Some(player)
    }

    /// The clan's roster resolved to player records, skipping members the
    /// host can no longer resolve.
    fn clan_members(&self, clan: ClanId) -> Vec<PlayerInfo> {
        self.clan_roster(clan)
            .into_iter()
            .filter_map(|id| self.player(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeHost;

    #[test]
    fn leader_is_roster_entry_at_leader_index() {
        let host = FakeHost::new();
        let clan = host.add_clan(1, "Nightfall");
        let a = host.add_player(10, "Ada", Some(clan));
        let b = host.add_player(11, "Bram", Some(clan));
        host.set_leader(clan, b);

        assert!(host.is_clan_leader(b));
        assert!(!host.is_clan_leader(a));
    }

    #[test]
    fn clanless_player_is_not_a_leader() {
        let host = FakeHost::new();
        let solo = host.add_player(10, "Solo", None);
        assert!(!host.is_clan_leader(solo));
    }

    #[test]
    fn clan_members_resolves_roster_in_order() {
        let host = FakeHost::new();
        let clan = host.add_clan(1, "Nightfall");
        host.add_player(10, "Ada", Some(clan));
        host.add_player(11, "Bram", Some(clan));
        let names: Vec<_> = host
            .clan_members(clan)
            .into_iter()
            .map(|info| info.name)
            .collect();
        assert_eq!(names, vec!["Ada", "Bram"]);
    }
}
