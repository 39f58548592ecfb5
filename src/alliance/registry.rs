use std::collections::BTreeSet;

use parking_lot::Mutex;

use super::book::AllianceBook;
use crate::config::GuardConfig;
use crate::error::AllianceError;
use crate::host::{HostWorld, PlayerInfo};
use crate::id::{ClanId, PlayerId};
use crate::store::AllianceStores;

/// Alliance settings extracted from [`GuardConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllianceRules {
    pub enabled: bool,
    pub clan_mode: bool,
    pub max_size: usize,
}

impl From<&GuardConfig> for AllianceRules {
    fn from(config: &GuardConfig) -> Self {
        Self {
            enabled: config.alliances,
            clan_mode: config.clan_mode(),
            max_size: config.max_alliance_size.max(1),
        }
    }
}

/// Result of a successful invite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recruited {
    /// Names that joined, in roster order.
    pub added: Vec<String>,
    /// The whole group afterwards.
    pub members: BTreeSet<String>,
}

/// Owner-keyed alliance groups and recruitable flags behind one lock.
///
/// Every mutation is written through to the backing stores before the lock
/// is released. Host lookups happen outside the lock wherever the result does
/// not depend on registry state.
#[derive(Debug)]
pub struct AllianceRegistry {
    rules: AllianceRules,
    book: Mutex<AllianceBook>,
    stores: Option<AllianceStores>,
}

impl AllianceRegistry {
    /// Load both stores from `config.data_dir`. Groups are only loaded when
    /// alliances are enabled.
    pub fn open(config: &GuardConfig) -> Self {
        Self::with_stores(config, AllianceStores::in_dir(&config.data_dir))
    }

    pub fn with_stores(config: &GuardConfig, stores: AllianceStores) -> Self {
        let bools = stores.bools.load();
        let groups = if config.alliances {
            stores.alliances.load()
        } else {
            Default::default()
        };
        tracing::info!(
            "loaded {} alliance(s) and {} player flag bag(s)",
            groups.len(),
            bools.len()
        );
        Self {
            rules: AllianceRules::from(config),
            book: Mutex::new(AllianceBook::new(groups, bools)),
            stores: Some(stores),
        }
    }

    /// A registry that never touches disk.
    pub fn in_memory(config: &GuardConfig) -> Self {
        Self {
            rules: AllianceRules::from(config),
            book: Mutex::new(AllianceBook::default()),
            stores: None,
        }
    }

    pub fn rules(&self) -> AllianceRules {
        self.rules
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> AllianceBook {
        self.book.lock().clone()
    }

    fn persist(&self, book: &AllianceBook) {
        if let Some(stores) = &self.stores {
            // Failures are logged by the store; in-memory state stays authoritative.
            let _ = stores.alliances.save(&book.groups);
            let _ = stores.bools.save(&book.bools);
        }
    }

    fn caller(&self, host: &dyn HostWorld, id: PlayerId) -> Result<PlayerInfo, AllianceError> {
        if !self.rules.enabled {
            return Err(AllianceError::Disabled);
        }
        host.player(id).ok_or(AllianceError::PlayerNotFound)
    }

    fn require_leader(&self, host: &dyn HostWorld, caller: &PlayerInfo) -> Result<(), AllianceError> {
        if self.rules.clan_mode && (caller.clan.is_none() || !host.is_clan_leader(caller.id)) {
            return Err(AllianceError::NotClanLeader);
        }
        Ok(())
    }

    // -- Commands -----------------------------------------------------------

    /// Flip the caller's recruitable flag. Returns the new value.
    pub fn toggle_recruitable(
        &self,
        host: &dyn HostWorld,
        caller: PlayerId,
    ) -> Result<bool, AllianceError> {
        let info = self.caller(host, caller)?;
        self.require_leader(host, &info)?;

        let mut book = self.book.lock();
        if book.is_grouped(info.id, &info.name) {
            return Err(AllianceError::AlreadyGrouped);
        }
        let value = book.toggle_recruitable(info.id);
        self.persist(&book);
        tracing::debug!("player {} recruitable = {value}", info.id);
        Ok(value)
    }

    /// Invite a player (player mode) or a whole clan (clan mode) into the
    /// caller's group, founding it if needed.
    pub fn invite(
        &self,
        host: &dyn HostWorld,
        owner: PlayerId,
        target: &str,
    ) -> Result<Recruited, AllianceError> {
        let owner = self.caller(host, owner)?;
        if self.rules.clan_mode {
            self.require_leader(host, &owner)?;
            self.invite_clan(host, &owner, target)
        } else {
            self.invite_player(host, &owner, target)
        }
    }

    fn invite_player(
        &self,
        host: &dyn HostWorld,
        owner: &PlayerInfo,
        target: &str,
    ) -> Result<Recruited, AllianceError> {
        let target = host
            .find_player(target)
            .filter(|found| found.id != owner.id)
            .ok_or(AllianceError::PlayerNotFound)?;

        let free = free_members(host, owner);
        let founders: BTreeSet<String> = free.iter().map(|p| p.name.clone()).collect();
        let mut book = self.book.lock();
        if !book.is_recruitable(target.id) || book.is_grouped(target.id, &target.name) {
            return Err(AllianceError::NotEligible { name: target.name });
        }

        let mut members = book.members_or_founding(owner.id, &founders);
        if members.contains(&target.name) {
            return Err(AllianceError::AlreadyMember { name: target.name });
        }
        if members.len() + 1 > self.rules.max_size {
            return Err(AllianceError::CapacityExceeded { requested: 1 });
        }

        // Consent is consumed under the same lock that admits the member.
        book.consume_recruitable(target.id);
        if !book.groups.contains_key(&owner.id) {
            for player in &free {
                book.consume_recruitable(player.id);
            }
        }
        members.insert(target.name.clone());
        book.groups.insert(owner.id, members.clone());
        self.persist(&book);

        tracing::debug!("player {} recruited {} into their alliance", owner.id, target.name);
        Ok(Recruited {
            added: vec![target.name],
            members,
        })
    }

    fn invite_clan(
        &self,
        host: &dyn HostWorld,
        owner: &PlayerInfo,
        target: &str,
    ) -> Result<Recruited, AllianceError> {
        let clan = host.find_clan(target).ok_or(AllianceError::ClanNotFound)?;
        if owner.clan == Some(clan) {
            return Err(AllianceError::NothingToAdd);
        }
        let roster = host.clan_roster(clan);
        let leader = host
            .clan_leader_index(clan)
            .and_then(|index| roster.get(index).copied())
            .and_then(|id| host.player(id))
            .ok_or(AllianceError::LeaderNotFound)?;
        let recruits: Vec<PlayerInfo> = roster.iter().filter_map(|id| host.player(*id)).collect();

        let free = free_members(host, owner);
        let free_names: BTreeSet<String> = free.iter().map(|p| p.name.clone()).collect();

        let mut book = self.book.lock();
        if !book.is_recruitable(leader.id) || book.is_grouped(leader.id, &leader.name) {
            return Err(AllianceError::LeaderNotRecruitable);
        }

        let mut members = book.members_or_founding(owner.id, &free_names);
        let added: Vec<String> = recruits
            .iter()
            .map(|p| p.name.clone())
            .filter(|name| !members.contains(name))
            .collect();
        if added.is_empty() {
            return Err(AllianceError::NothingToAdd);
        }

        let free_present = members.iter().filter(|m| free_names.contains(*m)).count();
        let counted = members.len() + added.len() - free_present;
        if counted >= self.rules.max_size {
            return Err(AllianceError::CapacityExceeded {
                requested: added.len(),
            });
        }

        book.consume_recruitable(leader.id);
        let founding = !book.groups.contains_key(&owner.id);
        for player in recruits.iter().chain(free.iter().filter(|_| founding)) {
            book.consume_recruitable(player.id);
        }
        members.extend(added.iter().cloned());
        book.groups.insert(owner.id, members.clone());
        self.persist(&book);

        tracing::debug!(
            "player {} recruited clan {clan} ({} member(s)) into their alliance",
            owner.id,
            added.len()
        );
        Ok(Recruited { added, members })
    }

    /// Remove a member (player mode) or every current member of a clan (clan
    /// mode) from the caller's group. Returns the names removed.
    pub fn revoke(
        &self,
        host: &dyn HostWorld,
        owner: PlayerId,
        target: &str,
    ) -> Result<Vec<String>, AllianceError> {
        let owner = self.caller(host, owner)?;
        self.require_leader(host, &owner)?;

        if self.rules.clan_mode {
            let clan = host.find_clan(target).ok_or(AllianceError::ClanNotFound)?;
            let mut book = self.book.lock();
            let members = book
                .groups
                .get(&owner.id)
                .cloned()
                .ok_or(AllianceError::NoAlliance)?;
            let in_clan = members_of_clan(host, &members, clan);
            let removed = book.remove_members(owner.id, Some(&owner.name), &in_clan);
            self.persist(&book);
            return Ok(removed);
        }

        let mut book = self.book.lock();
        let members = book.groups.get(&owner.id).ok_or(AllianceError::NoAlliance)?;
        let name = members
            .iter()
            .find(|m| m.eq_ignore_ascii_case(target))
            .cloned()
            .ok_or_else(|| AllianceError::NotAMember {
                name: target.to_string(),
            })?;
        if name == owner.name {
            return Err(AllianceError::OwnerCannotLeave);
        }
        let removed = book.remove_members(owner.id, Some(&owner.name), &[name]);
        self.persist(&book);
        Ok(removed)
    }

    /// Delete the caller's group. Returns its former members.
    pub fn disband(
        &self,
        host: &dyn HostWorld,
        owner: PlayerId,
    ) -> Result<BTreeSet<String>, AllianceError> {
        let owner = self.caller(host, owner)?;
        self.require_leader(host, &owner)?;

        let mut book = self.book.lock();
        let members = book
            .groups
            .remove(&owner.id)
            .ok_or(AllianceError::NoAlliance)?;
        self.persist(&book);
        tracing::debug!("player {} disbanded their alliance", owner.id);
        Ok(members)
    }

    /// Remove the caller (clan mode: the caller's clan) from the group that
    /// lists them. Owners must disband instead.
    pub fn leave(
        &self,
        host: &dyn HostWorld,
        caller: PlayerId,
    ) -> Result<Vec<String>, AllianceError> {
        let caller = self.caller(host, caller)?;
        self.require_leader(host, &caller)?;

        let mut book = self.book.lock();
        if book.groups.contains_key(&caller.id) {
            return Err(AllianceError::OwnerCannotLeave);
        }
        let owner = book
            .owner_of_member(&caller.name)
            .ok_or(AllianceError::NotInAlliance)?;
        let owner_name = host.player(owner).map(|p| p.name);

        let leaving = match (self.rules.clan_mode, caller.clan) {
            (true, Some(clan)) => {
                let members = book.groups.get(&owner).cloned().unwrap_or_default();
                members_of_clan(host, &members, clan)
            }
            _ => vec![caller.name.clone()],
        };
        let removed = book.remove_members(owner, owner_name.as_deref(), &leaving);
        self.persist(&book);
        Ok(removed)
    }

    /// The group the caller belongs to, or the group of the named player. An
    /// unknown name is matched case-insensitively against stored members.
    pub fn lookup(
        &self,
        host: &dyn HostWorld,
        caller: PlayerId,
        name: Option<&str>,
    ) -> Result<BTreeSet<String>, AllianceError> {
        let caller = self.caller(host, caller)?;
        let book = self.book.lock();
        let members = match name.filter(|n| !n.trim().is_empty()) {
            None => book.membership(caller.id, &caller.name),
            Some(name) => match host.find_player(name) {
                Some(found) => book.membership(found.id, &found.name),
                None => book
                    .groups
                    .values()
                    .find(|members| members.iter().any(|m| m.eq_ignore_ascii_case(name)))
                    .cloned()
                    .unwrap_or_default(),
            },
        };
        Ok(members)
    }

    // -- Hooks and read access ----------------------------------------------

    /// Seed a newly connected player's flag bag. Returns whether it was created.
    pub fn on_player_connected(&self, player: PlayerId) -> bool {
        if !self.rules.enabled {
            return false;
        }
        let mut book = self.book.lock();
        let created = book.ensure_player(player);
        if created {
            self.persist(&book);
        }
        created
    }

    pub fn is_recruitable(&self, player: PlayerId) -> bool {
        self.book.lock().is_recruitable(player)
    }

    pub fn group(&self, owner: PlayerId) -> Option<BTreeSet<String>> {
        self.book.lock().groups.get(&owner).cloned()
    }

    /// Every name sharing a group with `name`, including `name` itself.
    pub fn extension(&self, name: &str) -> BTreeSet<String> {
        self.book.lock().extension(name)
    }

    pub fn are_allied(&self, a: &str, b: &str) -> bool {
        self.book.lock().are_allied(a, b)
    }
}

/// The owner plus their current clan-mates; the members that found a group
/// and, in clan mode, do not count toward the cap.
fn free_members(host: &dyn HostWorld, owner: &PlayerInfo) -> Vec<PlayerInfo> {
    let mut free = vec![owner.clone()];
    if let Some(clan) = owner.clan {
        free.extend(host.clan_members(clan).into_iter().filter(|p| p.id != owner.id));
    }
    free
}

/// Stored member names whose player currently belongs to `clan`.
fn members_of_clan(host: &dyn HostWorld, members: &BTreeSet<String>, clan: ClanId) -> Vec<String> {
    members
        .iter()
        .filter(|name| {
            host.find_player(name)
                .is_some_and(|p| p.name == **name && p.clan == Some(clan))
        })
        .cloned()
        .collect()
}
