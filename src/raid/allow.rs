use std::collections::HashSet;

use crate::alliance::AllianceRegistry;
use crate::host::HostWorld;
use crate::id::PlayerId;

/// Who may be inside a raided territory, computed when a breach is reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowLists {
    /// Everyone authorized: both sides.
    pub allowed: HashSet<PlayerId>,
    /// Defending side (owner clan plus owner alliance), in roster order.
    pub allies: Vec<PlayerId>,
    /// Raiding clan, in roster order.
    pub raiders: Vec<PlayerId>,
}

impl AllowLists {
    /// Resolve both sides through the host. The owner side is extended with
    /// the owner's alliance when `include_alliances` is set.
    pub fn compute(
        host: &dyn HostWorld,
        alliances: &AllianceRegistry,
        include_alliances: bool,
        owner: PlayerId,
        attacker: PlayerId,
    ) -> Self {
        let allies = defender_roster(host, alliances, include_alliances, owner);
        let raiders = clan_roster_of(host, attacker);
        let allowed = allies.iter().chain(raiders.iter()).copied().collect();
        Self {
            allowed,
            allies,
            raiders,
        }
    }

    /// Union `other` into `self`. Existing order is kept; new identities are
    /// appended. Nothing is ever removed.
    pub fn merge(&mut self, other: AllowLists) {
        self.allowed.extend(other.allowed);
        for id in other.allies {
            push_unique(&mut self.allies, id);
        }
        for id in other.raiders {
            push_unique(&mut self.raiders, id);
        }
    }
}

/// The player's clan roster, or just the player when clanless.
pub fn clan_roster_of(host: &dyn HostWorld, player: PlayerId) -> Vec<PlayerId> {
    let roster = host
        .player(player)
        .and_then(|info| info.clan)
        .map(|clan| host.clan_roster(clan))
        .unwrap_or_default();
    if roster.is_empty() {
        vec![player]
    } else {
        roster
    }
}

/// Owner clan plus, optionally, every player sharing an alliance with the
/// owner. Alliance members the host cannot resolve by exact name are skipped.
pub fn defender_roster(
    host: &dyn HostWorld,
    alliances: &AllianceRegistry,
    include_alliances: bool,
    owner: PlayerId,
) -> Vec<PlayerId> {
    let mut roster = clan_roster_of(host, owner);
    if !include_alliances {
        return roster;
    }
    let Some(owner_info) = host.player(owner) else {
        return roster;
    };
    for name in alliances.extension(&owner_info.name) {
        if let Some(member) = host.find_player(&name).filter(|p| p.name == name) {
            push_unique(&mut roster, member.id);
        }
    }
    roster
}

fn push_unique(list: &mut Vec<PlayerId>, id: PlayerId) {
    if !list.contains(&id) {
        list.push(id);
    }
}
