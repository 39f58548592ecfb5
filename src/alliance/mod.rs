//! Owner-keyed alliance groups with player-invite and clan-consent modes.

pub mod book;
pub mod commands;
pub mod registry;

pub use book::AllianceBook;
pub use commands::{AllianceCommand, execute};
pub use registry::{AllianceRegistry, AllianceRules, Recruited};
