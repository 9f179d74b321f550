//! Effective validity windows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Half-open validity window `[start, end)`.
///
/// An absent `end` means the window never expires on its own.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use plenum_domain::core::window::EffectiveWindow;
///
/// let start = Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2026, 8, 1, 17, 0, 0).unwrap();
/// let window = EffectiveWindow::between(start, end);
///
/// assert!(window.contains(Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()));
/// assert!(window.expired_at(end));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveWindow {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl EffectiveWindow {
    /// Window starting at `start` with no expiry.
    pub fn from(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    /// Bounded window `[start, end)`.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Whether `at` falls inside the window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && !self.expired_at(at)
    }

    /// Whether the window has elapsed at `at`.
    pub fn expired_at(&self, at: DateTime<Utc>) -> bool {
        match self.end {
            Some(end) => at >= end,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn test_bounded_window() {
        let w = EffectiveWindow::between(t(9), t(17));
        assert!(!w.contains(t(8)));
        assert!(w.contains(t(9)));
        assert!(w.contains(t(16)));
        assert!(!w.contains(t(17)));
        assert!(w.expired_at(t(18)));
    }

    #[test]
    fn test_unbounded_window_never_expires() {
        let w = EffectiveWindow::from(t(9));
        assert!(w.contains(t(23)));
        assert!(!w.expired_at(t(23)));
    }
}
