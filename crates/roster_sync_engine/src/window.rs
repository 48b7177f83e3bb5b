//! Sync windows: hour-of-day ranges in which scheduled syncs may run.

use chrono::{NaiveTime, Timelike};

/// One hour range on a 24-hour clock.
///
/// An `end` past 24 wraps past midnight: `{ start: 23, end: 26 }` covers
/// 23:00 to 02:00.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncWindow {
    /// First admitted hour (inclusive).
    pub start: f64,
    /// Last admitted hour (exclusive), up to 48.
    pub end: f64,
}

impl SyncWindow {
    /// Creates a window.
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Returns true if `hour` (fractional, 0..24) is inside the window.
    pub fn contains_hour(&self, hour: f64) -> bool {
        if self.end > 24.0 {
            hour >= self.start || hour < self.end - 24.0
        } else {
            hour >= self.start && hour < self.end
        }
    }

    /// Returns true if the time of day is inside the window.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.contains_hour(fractional_hour(time))
    }
}

/// The set of windows in which the scheduler may sync.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncWindows {
    windows: Vec<SyncWindow>,
}

impl SyncWindows {
    /// Creates a set from explicit windows.
    pub fn new(windows: Vec<SyncWindow>) -> Self {
        Self { windows }
    }

    /// A set admitting every hour.
    pub fn always() -> Self {
        Self::new(vec![SyncWindow::new(0.0, 24.0)])
    }

    /// Returns the windows.
    pub fn windows(&self) -> &[SyncWindow] {
        &self.windows
    }

    /// Returns true if any window admits the time of day.
    pub fn contains(&self, time: NaiveTime) -> bool {
        let hour = fractional_hour(time);
        self.windows.iter().any(|w| w.contains_hour(hour))
    }
}

impl Default for SyncWindows {
    /// Late morning, evening, and the wrap past midnight.
    fn default() -> Self {
        Self::new(vec![
            SyncWindow::new(10.0, 13.0),
            SyncWindow::new(19.0, 23.0),
            SyncWindow::new(23.0, 26.0),
        ])
    }
}

fn fractional_hour(time: NaiveTime) -> f64 {
    f64::from(time.hour()) + f64::from(time.minute()) / 60.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn wrapping_window() {
        let window = SyncWindow::new(23.0, 26.0);
        assert!(window.contains(at(23, 30)));
        assert!(window.contains(at(0, 30)));
        assert!(window.contains(at(1, 30)));
        assert!(!window.contains(at(2, 30)));
        assert!(!window.contains(at(12, 0)));
    }

    #[test]
    fn plain_window_bounds() {
        let window = SyncWindow::new(10.0, 13.0);
        assert!(!window.contains(at(9, 59)));
        assert!(window.contains(at(10, 0)));
        assert!(window.contains(at(12, 59)));
        assert!(!window.contains(at(13, 0)));
    }

    #[test]
    fn default_windows() {
        let windows = SyncWindows::default();
        assert!(windows.contains(at(11, 15)));
        assert!(windows.contains(at(20, 0)));
        assert!(windows.contains(at(1, 0)));
        assert!(!windows.contains(at(15, 0)));
        assert!(!windows.contains(at(6, 0)));
    }

    proptest! {
        #[test]
        fn always_admits_everything(h in 0u32..24, m in 0u32..60) {
            prop_assert!(SyncWindows::always().contains(at(h, m)));
        }

        #[test]
        fn wrapped_window_is_circular_interval(start in 12u32..24, span in 1u32..12, h in 0u32..24, m in 0u32..60) {
            let window = SyncWindow::new(f64::from(start), f64::from(start + span));
            let hour = f64::from(h) + f64::from(m) / 60.0;
            let offset = (hour - f64::from(start)).rem_euclid(24.0);
            prop_assert_eq!(window.contains(at(h, m)), offset < f64::from(span));
        }
    }
}
