//! Clock port.

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Use cases never call `Utc::now()` directly; tests pin the clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
