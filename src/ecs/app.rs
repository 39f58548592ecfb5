use std::sync::Arc;

use bevy_app::App;
use bevy_ecs::message::MessageRegistry;
use bevy_ecs::schedule::{ExecutorKind, IntoScheduleConfigs};

use super::clock::GuardClock;
use super::events::{PlayerConnected, SiegeBreached};
use super::plugin::GuardPlugin;
use super::schedule::{GuardPhase, configure_guard_schedule};
use crate::alliance::AllianceRegistry;
use crate::config::GuardConfig;
use crate::guard::RaidGuard;
use crate::host::HostWorld;

/// Build a headless Bevy app driving the guard from host ticks.
///
/// Manual tick control:
/// ```no_run
/// # use std::sync::Arc;
/// # use raid_guard::alliance::AllianceRegistry;
/// # use raid_guard::config::GuardConfig;
/// # use raid_guard::ecs::{GuardTick, build_guard_app};
/// # use raid_guard::testutil::FakeHost;
/// let config = GuardConfig::default();
/// let registry = Arc::new(AllianceRegistry::open(&config));
/// let mut app = build_guard_app(Arc::new(FakeHost::new()), config, registry);
/// loop {
///     app.world_mut().run_schedule(GuardTick);
/// }
/// ```
pub fn build_guard_app(
    host: Arc<dyn HostWorld>,
    config: GuardConfig,
    registry: Arc<AllianceRegistry>,
) -> App {
    build_guard_app_with_guard(RaidGuard::new(host, config, registry))
}

/// Build the app around an existing guard, sharing its stores.
pub fn build_guard_app_with_guard(guard: RaidGuard) -> App {
    let mut app = App::empty();

    app.insert_resource(guard);
    app.init_resource::<GuardClock>();

    MessageRegistry::register_message::<SiegeBreached>(app.world_mut());
    MessageRegistry::register_message::<PlayerConnected>(app.world_mut());

    // Session state is shared with the damage pass; keep the tick single-threaded.
    let mut schedule = configure_guard_schedule(ExecutorKind::SingleThreaded);
    schedule.add_systems(bevy_ecs::message::message_update_system.in_set(GuardPhase::First));
    app.add_schedule(schedule);
    app.add_plugins(GuardPlugin);
    app
}
