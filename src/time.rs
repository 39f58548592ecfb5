use std::fmt;

pub const MILLIS_PER_SECOND: u64 = 1_000;

/// Host server time as elapsed milliseconds since the server started.
///
/// A plain `u64` wrapper; natural ordering is chronological ordering. The core
/// never reads a wall clock itself: every timestamp comes from
/// [`HostWorld::server_time`](crate::host::HostWorld::server_time).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerTime(u64);

impl ServerTime {
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(MILLIS_PER_SECOND))
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// The instant `secs` seconds after `self` (saturating).
    pub fn plus_secs(self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs.saturating_mul(MILLIS_PER_SECOND)))
    }

    /// Milliseconds elapsed between `earlier` and `self` (saturating).
    pub fn millis_since(self, earlier: ServerTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for ServerTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}s", self.0 / MILLIS_PER_SECOND, self.0 % MILLIS_PER_SECOND)
    }
}
