use std::fmt;

use serde::{Deserialize, Serialize};

/// Generates an opaque identity token backed by a host-assigned `u64`.
///
/// Tokens are stable across ticks and process restarts; they never carry an
/// engine handle, so every use must be re-resolved through the host.
macro_rules! identity {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn raw(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

identity!(PlayerId, "Stable platform identity of a player.");
identity!(ClanId, "Host identity of a clan.");
identity!(StructureId, "Host identity of a contested structure (and its territory).");
identity!(EngineId, "Host identity of a siege engine.");
