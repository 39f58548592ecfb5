use bevy_ecs::message::Message;

use crate::id::{PlayerId, StructureId};

/// A structure's defenses were breached. Written by the host.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SiegeBreached {
    pub attacker: PlayerId,
    pub structure: StructureId,
    /// The breach was made by a siege engine operated by `attacker`.
    pub via_engine: bool,
}

/// A player finished connecting. Written by the host.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerConnected {
    pub player: PlayerId,
}
