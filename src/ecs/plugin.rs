use bevy_app::{App, Plugin};

use super::systems::ingest::IngestPlugin;
use super::systems::monitor::MonitorPlugin;

/// Aggregate plugin that installs the guard's ingest and monitor systems.
pub struct GuardPlugin;

impl Plugin for GuardPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((IngestPlugin, MonitorPlugin));
    }
}
