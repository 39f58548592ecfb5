//! Raid sweep system (Monitor phase), gated by `monitor_running`.

use bevy_app::{App, Plugin};
use bevy_ecs::resource::Resource;
use bevy_ecs::schedule::IntoScheduleConfigs;
use bevy_ecs::system::{Res, ResMut};

use crate::ecs::conditions::monitor_running;
use crate::ecs::schedule::{GuardPhase, GuardTick};
use crate::guard::RaidGuard;
use crate::raid::PollReport;

/// Report of the most recent sweep step.
#[derive(Resource, Debug, Default)]
pub struct LastPoll(pub PollReport);

pub struct MonitorPlugin;

impl Plugin for MonitorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LastPoll>();
        app.add_systems(
            GuardTick,
            poll_raids
                .run_if(monitor_running)
                .in_set(GuardPhase::Monitor),
        );
    }
}

fn poll_raids(guard: Res<RaidGuard>, mut last: ResMut<LastPoll>) {
    let report = guard.poll();
    if report.faults > 0 {
        tracing::warn!("raid sweep step had {} host fault(s)", report.faults);
    }
    last.0 = report;
}
