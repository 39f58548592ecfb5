use bevy_ecs::schedule::{ExecutorKind, IntoScheduleConfigs, Schedule, ScheduleLabel, SystemSet};

use super::clock::advance_clock;

/// Schedule label for one guard step.
/// The host runs it once per server frame via `app.world_mut().run_schedule(GuardTick)`.
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct GuardTick;

/// Ordered phases within each guard tick.
///
/// Phases run in declaration order: First < Ingest < Monitor < Last.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GuardPhase {
    /// Message buffer rotation.
    First,
    /// Host events (connections, breaches) applied to the stores.
    Ingest,
    /// Budgeted raid sweep.
    Monitor,
    Last,
}

/// Build a configured `GuardTick` schedule with phase ordering.
pub fn configure_guard_schedule(executor: ExecutorKind) -> Schedule {
    let mut schedule = Schedule::new(GuardTick);
    schedule.set_executor_kind(executor);
    schedule.configure_sets(
        (
            GuardPhase::First,
            GuardPhase::Ingest,
            GuardPhase::Monitor,
            GuardPhase::Last,
        )
            .chain(),
    );
    schedule.add_systems(advance_clock.in_set(GuardPhase::Last));
    schedule
}
