//! Territory monitoring during sieges.
//!
//! A breach opens a [`RaidSession`] for the contested structure. While any
//! session is live, the [`RaidMonitor`] sweeps every connected player against
//! every session and punishes unauthorized or over-cap presence.

pub mod allow;
pub mod monitor;
pub mod session;

pub use allow::AllowLists;
pub use monitor::{
    BreachOutcome, MonitorState, NOTICE_SPACING_MILLIS, PollReport, RaidMonitor, WorkUnit,
};
pub use session::{AssistLimits, RaidSession, Side, Violation};
