use bevy_ecs::system::Res;

use crate::guard::RaidGuard;

// Bevy run condition functions (for use with `.run_if()`).

/// An idle monitor costs nothing until a breach starts it.
pub fn monitor_running(guard: Res<RaidGuard>) -> bool {
    guard.raids().is_running()
}
