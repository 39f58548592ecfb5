use thiserror::Error;

/// Refusals from alliance operations. The `Display` text is the reply shown
/// to the player who issued the command; none of these are fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllianceError {
    #[error("Alliances are not enabled.")]
    Disabled,

    #[error("Player not found...")]
    PlayerNotFound,

    #[error("Clan/leader not found...")]
    ClanNotFound,

    #[error("Couldn't find clan leader to verify consent.")]
    LeaderNotFound,

    #[error("{name} does not have alliances enabled or is already in an alliance.")]
    NotEligible { name: String },

    #[error("Clan leader does not have alliance invites enabled or is already in an alliance.")]
    LeaderNotRecruitable,

    #[error("Alliance would exceed max size by adding {requested} member(s).")]
    CapacityExceeded { requested: usize },

    #[error("Couldn't find any members to add.")]
    NothingToAdd,

    #[error("{name} is already in the alliance.")]
    AlreadyMember { name: String },

    #[error("You must be the leader of a clan to do that.")]
    NotClanLeader,

    #[error("You don't have an alliance.")]
    NoAlliance,

    #[error("You're not in an alliance.")]
    NotInAlliance,

    #[error("{name} not found in alliance.")]
    NotAMember { name: String },

    #[error("You can't leave or remove yourself from your own alliance. Disband it instead.")]
    OwnerCannotLeave,

    #[error("You are already in an alliance. Leave or disband if owned before enabling invites.")]
    AlreadyGrouped,
}

/// Failures reported by the host while the core asks it to act.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("host data unavailable: {what}")]
    Unavailable { what: String },

    #[error("host rejected request: {0}")]
    Rejected(String),
}

/// Low-level persistence failures. Callers recover by falling back to an
/// empty store; these never reach a player.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_and_eligibility_replies_differ() {
        let full = AllianceError::CapacityExceeded { requested: 2 }.to_string();
        let ineligible = AllianceError::NotEligible {
            name: "Vlad".into(),
        }
        .to_string();
        assert_ne!(full, ineligible);
        assert!(ineligible.starts_with("Vlad"));
    }

    #[test]
    fn store_error_wraps_json() {
        let err: StoreError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.to_string().starts_with("JSON error"));
    }
}
