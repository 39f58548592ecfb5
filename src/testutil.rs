//! In-memory host double shared by unit and integration tests.

use std::collections::{BTreeMap, HashMap, HashSet};

use parking_lot::Mutex;

use crate::error::HostError;
use crate::host::{HostWorld, PlayerInfo, Position, PunitiveEffect};
use crate::id::{ClanId, PlayerId, StructureId};
use crate::time::ServerTime;

/// Axis-aligned tile rectangle standing in for a castle territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Territory {
    pub min: Position,
    pub max: Position,
}

impl Territory {
    pub fn new(min: (i32, i32), max: (i32, i32)) -> Self {
        Self {
            min: Position::new(min.0, min.1),
            max: Position::new(max.0, max.1),
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        (self.min.x..=self.max.x).contains(&pos.x) && (self.min.y..=self.max.y).contains(&pos.y)
    }

    /// A tile guaranteed to be inside.
    pub fn inside(&self) -> Position {
        self.min
    }
}

#[derive(Debug, Clone)]
struct FakeClan {
    name: String,
    roster: Vec<PlayerId>,
    leader: Option<usize>,
}

#[derive(Debug, Clone)]
struct FakeStructure {
    owner: PlayerId,
    territory: Territory,
    sieged: bool,
}

#[derive(Debug, Default)]
struct FakeState {
    now: ServerTime,
    players: BTreeMap<PlayerId, PlayerInfo>,
    connected: Vec<PlayerId>,
    positions: HashMap<PlayerId, Position>,
    clans: BTreeMap<ClanId, FakeClan>,
    structures: BTreeMap<StructureId, FakeStructure>,
    effects: HashSet<PlayerId>,
    applications: HashMap<PlayerId, usize>,
    messages: Vec<(PlayerId, String)>,
    failing: HashSet<PlayerId>,
}

/// Scriptable [`HostWorld`]. Players are connected on creation; clans list
/// members in insertion order and default to the first member as leader.
#[derive(Debug, Default)]
pub struct FakeHost {
    state: Mutex<FakeState>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_clan(&self, raw: u64, name: &str) -> ClanId {
        let id = ClanId(raw);
        self.state.lock().clans.insert(
            id,
            FakeClan {
                name: name.to_string(),
                roster: Vec::new(),
                leader: None,
            },
        );
        id
    }

    pub fn add_player(&self, raw: u64, name: &str, clan: Option<ClanId>) -> PlayerId {
        let id = PlayerId(raw);
        let mut state = self.state.lock();
        state.players.insert(
            id,
            PlayerInfo {
                id,
                name: name.to_string(),
                clan,
            },
        );
        state.connected.push(id);
        if let Some(clan) = clan.and_then(|c| state.clans.get_mut(&c)) {
            clan.roster.push(id);
            clan.leader.get_or_insert(0);
        }
        id
    }

    pub fn set_leader(&self, clan: ClanId, player: PlayerId) {
        let mut state = self.state.lock();
        if let Some(clan) = state.clans.get_mut(&clan) {
            clan.leader = clan.roster.iter().position(|p| *p == player);
        }
    }

    /// Remove the clan's leader role entirely.
    pub fn clear_leader(&self, clan: ClanId) {
        if let Some(clan) = self.state.lock().clans.get_mut(&clan) {
            clan.leader = None;
        }
    }

    /// Move a player to another clan (or out of any clan).
    pub fn set_clan(&self, player: PlayerId, clan: Option<ClanId>) {
        let mut state = self.state.lock();
        for existing in state.clans.values_mut() {
            if let Some(index) = existing.roster.iter().position(|p| *p == player) {
                existing.roster.remove(index);
                existing.leader = match existing.leader {
                    Some(l) if l == index => None,
                    Some(l) if l > index => Some(l - 1),
                    other => other,
                };
            }
        }
        if let Some(target) = clan.and_then(|c| state.clans.get_mut(&c)) {
            target.roster.push(player);
        }
        if let Some(info) = state.players.get_mut(&player) {
            info.clan = clan;
        }
    }

    pub fn disconnect(&self, player: PlayerId) {
        self.state.lock().connected.retain(|p| *p != player);
    }

    /// Drop a player from the host entirely so lookups no longer resolve them.
    pub fn forget(&self, player: PlayerId) {
        self.set_clan(player, None);
        let mut state = self.state.lock();
        state.players.remove(&player);
        state.connected.retain(|p| *p != player);
        state.positions.remove(&player);
    }

    pub fn connect(&self, player: PlayerId) {
        let mut state = self.state.lock();
        if !state.connected.contains(&player) {
            state.connected.push(player);
        }
    }

    pub fn add_structure(&self, raw: u64, owner: PlayerId, territory: Territory) -> StructureId {
        let id = StructureId(raw);
        self.state.lock().structures.insert(
            id,
            FakeStructure {
                owner,
                territory,
                sieged: true,
            },
        );
        id
    }

    pub fn set_sieged(&self, structure: StructureId, sieged: bool) {
        if let Some(s) = self.state.lock().structures.get_mut(&structure) {
            s.sieged = sieged;
        }
    }

    pub fn place(&self, player: PlayerId, position: Position) {
        self.state.lock().positions.insert(player, position);
    }

    pub fn unplace(&self, player: PlayerId) {
        self.state.lock().positions.remove(&player);
    }

    pub fn set_time(&self, now: ServerTime) {
        self.state.lock().now = now;
    }

    pub fn advance_secs(&self, secs: u64) {
        let mut state = self.state.lock();
        state.now = state.now.plus_secs(secs);
    }

    /// Make effect application fail for this player.
    pub fn fail_effects_for(&self, player: PlayerId) {
        self.state.lock().failing.insert(player);
    }

    /// Expire the player's debuff as the host would after its duration.
    pub fn expire_effect(&self, player: PlayerId) {
        self.state.lock().effects.remove(&player);
    }

    pub fn effect_applications(&self, player: PlayerId) -> usize {
        self.state
            .lock()
            .applications
            .get(&player)
            .copied()
            .unwrap_or(0)
    }

    pub fn messages_for(&self, player: PlayerId) -> Vec<String> {
        self.state
            .lock()
            .messages
            .iter()
            .filter(|(p, _)| *p == player)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

impl HostWorld for FakeHost {
    fn server_time(&self) -> ServerTime {
        self.state.lock().now
    }

    fn connected_players(&self) -> Vec<PlayerId> {
        self.state.lock().connected.clone()
    }

    fn player(&self, id: PlayerId) -> Option<PlayerInfo> {
        self.state.lock().players.get(&id).cloned()
    }

    fn find_player(&self, name: &str) -> Option<PlayerInfo> {
        self.state
            .lock()
            .players
            .values()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    fn find_clan(&self, name: &str) -> Option<ClanId> {
        self.state
            .lock()
            .clans
            .iter()
            .find(|(_, clan)| clan.name.eq_ignore_ascii_case(name))
            .map(|(id, _)| *id)
    }

    fn clan_name(&self, clan: ClanId) -> Option<String> {
        self.state.lock().clans.get(&clan).map(|c| c.name.clone())
    }

    fn clan_roster(&self, clan: ClanId) -> Vec<PlayerId> {
        self.state
            .lock()
            .clans
            .get(&clan)
            .map(|c| c.roster.clone())
            .unwrap_or_default()
    }

    fn clan_leader_index(&self, clan: ClanId) -> Option<usize> {
        self.state.lock().clans.get(&clan).and_then(|c| c.leader)
    }

    fn position(&self, player: PlayerId) -> Option<Position> {
        self.state.lock().positions.get(&player).copied()
    }

    fn is_in_territory(&self, position: Position, structure: StructureId) -> bool {
        self.state
            .lock()
            .structures
            .get(&structure)
            .is_some_and(|s| s.territory.contains(position))
    }

    fn is_structure_under_siege(&self, structure: StructureId) -> bool {
        self.state
            .lock()
            .structures
            .get(&structure)
            .is_some_and(|s| s.sieged)
    }

    fn structure_owner(&self, structure: StructureId) -> Option<PlayerId> {
        self.state.lock().structures.get(&structure).map(|s| s.owner)
    }

    fn has_punitive_effect(&self, player: PlayerId) -> bool {
        self.state.lock().effects.contains(&player)
    }

    fn apply_punitive_effect(
        &self,
        player: PlayerId,
        _effect: &PunitiveEffect,
    ) -> Result<(), HostError> {
        let mut state = self.state.lock();
        if state.failing.contains(&player) {
            return Err(HostError::Unavailable {
                what: format!("character of player {player}"),
            });
        }
        state.effects.insert(player);
        *state.applications.entry(player).or_default() += 1;
        Ok(())
    }

    fn send_message(&self, player: PlayerId, text: &str) -> Result<(), HostError> {
        self.state.lock().messages.push((player, text.to_string()));
        Ok(())
    }
}
