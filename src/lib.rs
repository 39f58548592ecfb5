pub mod alliance;
pub mod config;
pub mod ecs;
pub mod error;
pub mod gate;
pub mod guard;
pub mod host;
pub mod id;
pub mod protection;
pub mod raid;
pub mod store;
pub mod testutil;
pub mod time;

pub use alliance::{AllianceCommand, AllianceRegistry};
pub use config::GuardConfig;
pub use error::{AllianceError, HostError, StoreError};
pub use gate::{DamageEvent, DamageKind, DamageTarget, DamageVerdict, VetoReason};
pub use guard::RaidGuard;
pub use host::{HostWorld, PlayerInfo, Position, PunitiveEffect};
pub use id::{ClanId, EngineId, PlayerId, StructureId};
pub use raid::{BreachOutcome, MonitorState, RaidMonitor, RaidSession, Violation};
pub use time::ServerTime;
