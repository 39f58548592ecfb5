use std::collections::BTreeSet;

use super::registry::AllianceRegistry;
use crate::host::HostWorld;
use crate::id::PlayerId;

/// Player-facing alliance commands. Parsing chat input into these is the
/// host's job; each maps to exactly one registry operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllianceCommand {
    ToggleRecruitable,
    Add(String),
    Remove(String),
    List(Option<String>),
    Disband,
    Leave,
}

/// Run a command for `caller` and render the reply text.
pub fn execute(
    registry: &AllianceRegistry,
    host: &dyn HostWorld,
    caller: PlayerId,
    command: &AllianceCommand,
) -> String {
    let reply = match command {
        AllianceCommand::ToggleRecruitable => registry
            .toggle_recruitable(host, caller)
            .map(|enabled| {
                let state = if enabled { "enabled" } else { "disabled" };
                format!("Alliance invites {state}.")
            }),
        AllianceCommand::Add(name) => registry
            .invite(host, caller, name)
            .map(|recruited| match recruited.added.as_slice() {
                [single] => format!("{single} added to alliance."),
                many => format!("{} were added to the alliance.", many.join(", ")),
            }),
        AllianceCommand::Remove(name) => registry
            .revoke(host, caller, name)
            .map(|removed| removed_reply(&removed)),
        AllianceCommand::List(name) => registry
            .lookup(host, caller, name.as_deref())
            .map(|members| list_reply(&members)),
        AllianceCommand::Disband => registry
            .disband(host, caller)
            .map(|_| "Alliance disbanded.".to_string()),
        AllianceCommand::Leave => registry
            .leave(host, caller)
            .map(|removed| removed_reply(&removed)),
    };
    reply.unwrap_or_else(|err| err.to_string())
}

fn removed_reply(removed: &[String]) -> String {
    if removed.is_empty() {
        "No members found to remove.".to_string()
    } else {
        format!("{} removed from alliance.", removed.join(", "))
    }
}

fn list_reply(members: &BTreeSet<String>) -> String {
    if members.is_empty() {
        return "No members in alliance.".to_string();
    }
    members.iter().cloned().collect::<Vec<_>>().join(", ")
}
