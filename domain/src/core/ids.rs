//! Identifier value objects.
//!
//! Every aggregate in the engine is addressed by a typed id wrapping a
//! string, so a `SessionId` can never be passed where a `GrantId` is
//! expected. Ids are serde-transparent and cheap to clone.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an id from an existing string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl<T: Into<String>> From<T> for $name {
            fn from(s: T) -> Self {
                Self::new(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Organization an entity belongs to (external identity domain).
    OrgId
);
string_id!(
    /// A scheduled meeting. Identity is immutable once created.
    MeetingId
);
string_id!(
    /// The workflow instance driving one meeting.
    InstanceId
);
string_id!(
    /// A participant identity, owned by the external membership system.
    UserId
);
string_id!(
    /// One proxy grant record in the delegation arena.
    GrantId
);
string_id!(
    /// A bounded voting event within a meeting.
    SessionId
);
string_id!(
    /// One resolution's vote inside a voting session.
    ItemId
);
string_id!(
    /// A resolution (motion) in the catalog.
    ResolutionId
);

impl GrantId {
    /// Generates a fresh grant id.
    pub fn generate() -> Self {
        Self(format!("grant-{}", unique_suffix()))
    }
}

impl SessionId {
    /// Generates a fresh session id.
    pub fn generate() -> Self {
        Self(format!("session-{}", unique_suffix()))
    }
}

impl ItemId {
    /// Generates a fresh session-item id.
    pub fn generate() -> Self {
        Self(format!("item-{}", unique_suffix()))
    }
}

impl InstanceId {
    /// Generates a fresh workflow-instance id.
    pub fn generate() -> Self {
        Self(format!("wf-{}", unique_suffix()))
    }
}

impl ResolutionId {
    /// Generates a fresh resolution id.
    pub fn generate() -> Self {
        Self(format!("res-{}", unique_suffix()))
    }
}

/// Time-derived unique suffix with a process-local counter to keep ids
/// distinct even when generated within the same nanosecond.
fn unique_suffix() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("{:012x}-{:04x}", (nanos & 0xffff_ffff_ffff) as u64, seq & 0xffff)
}
