use std::collections::HashSet;

use super::allow::AllowLists;
use crate::config::GuardConfig;
use crate::id::{PlayerId, StructureId};
use crate::time::ServerTime;

/// Which side of a raid an allowed participant fights on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Ally,
    Raider,
}

/// Why a player is being punished for standing in a raided territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Violation {
    NotAllowed,
    AllyCapReached,
    RaiderCapReached,
}

impl Violation {
    pub fn message(self) -> &'static str {
        match self {
            Violation::NotAllowed => "You are not allowed in this territory during a raid.",
            Violation::AllyCapReached => {
                "You are not allowed in this territory during a raid (maximum allied assists reached)."
            }
            Violation::RaiderCapReached => {
                "You are not allowed in this territory during a raid (maximum raider assists reached)."
            }
        }
    }

    fn cap_for(side: Side) -> Self {
        match side {
            Side::Ally => Violation::AllyCapReached,
            Side::Raider => Violation::RaiderCapReached,
        }
    }
}

/// Assist-cap settings extracted from [`GuardConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssistLimits {
    pub enabled: bool,
    /// First `max` arrivals per side are privileged.
    pub max: usize,
    /// Counted participants keep their slot after leaving.
    pub locked: bool,
}

impl From<&GuardConfig> for AssistLimits {
    fn from(config: &GuardConfig) -> Self {
        Self {
            enabled: config.limit_assists,
            max: config.alliance_assists.max(1),
            locked: config.lock_participants,
        }
    }
}

/// Monitoring state for one contested structure.
///
/// Allow-lists only ever grow. Active lists hold arrival order: an identity is
/// appended on first sighting inside the territory and never reordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaidSession {
    pub structure: StructureId,
    pub owner: PlayerId,
    pub started_at: ServerTime,
    pub allowed: HashSet<PlayerId>,
    pub allowed_allies: Vec<PlayerId>,
    pub allowed_raiders: Vec<PlayerId>,
    pub active_allies: Vec<PlayerId>,
    pub active_raiders: Vec<PlayerId>,
}

impl RaidSession {
    pub fn new(
        structure: StructureId,
        owner: PlayerId,
        lists: AllowLists,
        started_at: ServerTime,
    ) -> Self {
        Self {
            structure,
            owner,
            started_at,
            allowed: lists.allowed,
            allowed_allies: lists.allies,
            allowed_raiders: lists.raiders,
            active_allies: Vec::new(),
            active_raiders: Vec::new(),
        }
    }

    /// Re-union allow-lists from a repeated breach. Active lists are untouched.
    pub fn extend(&mut self, lists: AllowLists) {
        let mut current = AllowLists {
            allowed: std::mem::take(&mut self.allowed),
            allies: std::mem::take(&mut self.allowed_allies),
            raiders: std::mem::take(&mut self.allowed_raiders),
        };
        current.merge(lists);
        self.allowed = current.allowed;
        self.allowed_allies = current.allies;
        self.allowed_raiders = current.raiders;
    }

    pub fn is_allowed(&self, player: PlayerId) -> bool {
        self.allowed.contains(&player)
    }

    /// Defending side wins when a player appears on both.
    pub fn side_of(&self, player: PlayerId) -> Option<Side> {
        if self.allowed_allies.contains(&player) {
            Some(Side::Ally)
        } else if self.allowed_raiders.contains(&player) {
            Some(Side::Raider)
        } else {
            None
        }
    }

    pub fn active(&self, side: Side) -> &[PlayerId] {
        match side {
            Side::Ally => &self.active_allies,
            Side::Raider => &self.active_raiders,
        }
    }

    fn active_mut(&mut self, side: Side) -> &mut Vec<PlayerId> {
        match side {
            Side::Ally => &mut self.active_allies,
            Side::Raider => &mut self.active_raiders,
        }
    }

    /// Update arrival tracking for one sighting and decide whether the player
    /// must be punished.
    pub fn observe(
        &mut self,
        player: PlayerId,
        inside: bool,
        limits: &AssistLimits,
    ) -> Option<Violation> {
        if inside {
            if !self.is_allowed(player) {
                return Some(Violation::NotAllowed);
            }
            if !limits.enabled {
                return None;
            }
            let side = self.side_of(player)?;
            let active = self.active_mut(side);
            let arrival = match active.iter().position(|p| *p == player) {
                Some(index) => index,
                None => {
                    active.push(player);
                    active.len() - 1
                }
            };
            return (arrival >= limits.max).then_some(Violation::cap_for(side));
        }

        if limits.enabled && !limits.locked && self.is_allowed(player) {
            self.active_allies.retain(|p| *p != player);
            self.active_raiders.retain(|p| *p != player);
        }
        None
    }
}
