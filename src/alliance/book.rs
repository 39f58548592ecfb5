use std::collections::BTreeSet;

use crate::id::PlayerId;
use crate::store::{AllianceMap, PlayerBools, RECRUITABLE};

/// Alliance groups plus the per-player boolean bag, with the membership rules
/// that do not depend on the host. Not synchronized; the registry wraps it in
/// a single lock so flag checks and group mutations happen together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllianceBook {
    pub groups: AllianceMap,
    pub bools: PlayerBools,
}

impl AllianceBook {
    pub fn new(groups: AllianceMap, bools: PlayerBools) -> Self {
        Self { groups, bools }
    }

    /// Whether `id` owns a group or `name` appears in any group.
    pub fn is_grouped(&self, id: PlayerId, name: &str) -> bool {
        self.groups.contains_key(&id) || self.owner_of_member(name).is_some()
    }

    /// Owner of the first group listing `name` as a member (exact match).
    pub fn owner_of_member(&self, name: &str) -> Option<PlayerId> {
        self.groups
            .iter()
            .find(|(_, members)| members.contains(name))
            .map(|(owner, _)| *owner)
    }

    pub fn is_recruitable(&self, id: PlayerId) -> bool {
        self.bools
            .get(&id)
            .and_then(|flags| flags.get(RECRUITABLE))
            .copied()
            .unwrap_or(false)
    }

    /// Flip the recruitable flag, creating the entry if needed. Returns the
    /// new value.
    pub fn toggle_recruitable(&mut self, id: PlayerId) -> bool {
        let flag = self
            .bools
            .entry(id)
            .or_default()
            .entry(RECRUITABLE.to_string())
            .or_insert(false);
        *flag = !*flag;
        *flag
    }

    /// Clear the recruitable flag. Returns whether it was set.
    pub fn consume_recruitable(&mut self, id: PlayerId) -> bool {
        match self.bools.get_mut(&id).and_then(|f| f.get_mut(RECRUITABLE)) {
            Some(flag) => std::mem::replace(flag, false),
            None => false,
        }
    }

    /// Seed a player's bag with the recruitable flag off. Returns whether an
    /// entry was created.
    pub fn ensure_player(&mut self, id: PlayerId) -> bool {
        if self.bools.contains_key(&id) {
            return false;
        }
        self.bools
            .entry(id)
            .or_default()
            .insert(RECRUITABLE.to_string(), false);
        true
    }

    /// The owner's current members, or `founders` if the group does not exist
    /// yet. Nothing is written.
    pub fn members_or_founding(
        &self,
        owner: PlayerId,
        founders: &BTreeSet<String>,
    ) -> BTreeSet<String> {
        self.groups
            .get(&owner)
            .cloned()
            .unwrap_or_else(|| founders.clone())
    }

    /// Members of the group owned by `id`, or else every member of any group
    /// listing `name`.
    pub fn membership(&self, id: PlayerId, name: &str) -> BTreeSet<String> {
        if let Some(members) = self.groups.get(&id) {
            return members.clone();
        }
        self.extension(name)
    }

    /// Union of every group that lists `name`.
    pub fn extension(&self, name: &str) -> BTreeSet<String> {
        self.groups
            .values()
            .filter(|members| members.contains(name))
            .flat_map(|members| members.iter().cloned())
            .collect()
    }

    /// Whether both names appear together in a single group.
    pub fn are_allied(&self, a: &str, b: &str) -> bool {
        self.groups
            .values()
            .any(|members| members.contains(a) && members.contains(b))
    }

    /// Remove `names` from the owner's group, dropping the group once only
    /// its owner is left. Returns the names actually removed.
    pub fn remove_members(
        &mut self,
        owner: PlayerId,
        owner_name: Option<&str>,
        names: &[String],
    ) -> Vec<String> {
        let Some(members) = self.groups.get_mut(&owner) else {
            return Vec::new();
        };
        let removed: Vec<String> = names
            .iter()
            .filter(|name| Some(name.as_str()) != owner_name && members.remove(name.as_str()))
            .cloned()
            .collect();
        // An owner the host no longer resolves is assumed to be the one name left.
        let solo = match owner_name {
            Some(owner_name) => members.iter().all(|m| m == owner_name),
            None => members.len() <= 1,
        };
        if solo {
            self.groups.remove(&owner);
        }
        removed
    }
}
