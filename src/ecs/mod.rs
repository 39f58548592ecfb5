//! Bevy scheduling for the guard: a `GuardTick` schedule the host runs once
//! per server frame, host events as messages, and the budgeted raid sweep.

pub mod app;
pub mod clock;
pub mod conditions;
pub mod events;
pub mod plugin;
pub mod schedule;
pub mod systems;
pub mod test_helpers;

pub use app::{build_guard_app, build_guard_app_with_guard};
pub use clock::GuardClock;
pub use conditions::monitor_running;
pub use events::{PlayerConnected, SiegeBreached};
pub use plugin::GuardPlugin;
pub use schedule::{GuardPhase, GuardTick, configure_guard_schedule};
pub use systems::monitor::LastPoll;
