//! Byte counts to percentages

use std::sync::atomic::{AtomicI16, Ordering};

/// `round(loaded / total * 100)`, capped at 100
pub fn percent_of(loaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (loaded as f64 / total as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

/// Overall percentage of a sequential batch
///
/// `index` is the 0-based position of the item in flight and `item_percent`
/// its own progress: `round(100 * index / total + item_percent / total)`.
pub fn overall_percent(index: usize, total: usize, item_percent: u8) -> u8 {
    if total == 0 {
        return 0;
    }
    let total = total as f64;
    let value = 100.0 * index as f64 / total + f64::from(item_percent) / total;
    value.round().clamp(0.0, 100.0) as u8
}

/// Filters transport events down to increasing percentages
///
/// Transports may report from whichever thread is driving the body, so the
/// last value lives in an atomic.
#[derive(Debug)]
pub(crate) struct PercentTracker {
    last: AtomicI16,
}

impl PercentTracker {
    pub(crate) fn new() -> Self {
        Self {
            last: AtomicI16::new(-1),
        }
    }

    /// The percentage to report, if the total is known and it moved forward
    pub(crate) fn advance(&self, loaded: u64, total: Option<u64>) -> Option<u8> {
        let total = total?;
        let percent = percent_of(loaded, total);
        let previous = self.last.fetch_max(i16::from(percent), Ordering::SeqCst);
        (i16::from(percent) > previous).then_some(percent)
    }
}
