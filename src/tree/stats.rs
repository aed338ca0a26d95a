//! Per-node timing statistics.
//!
//! Each statistic is its own atomic, so concurrent adders never lose an
//! update and getters never see a torn value. Reads across several fields
//! are not a consistent snapshot; a reader may see a call count that is
//! newer than the timer next to it.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, AtomicU64, AtomicU8, Ordering};

use super::key::NodeKind;

/// Tri-state display filter flag, interpreted by the reporting layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum FilterStatus {
    AlwaysShow = 0,
    Conditional = 1,
    AlwaysHide = 2,
}

impl FilterStatus {
    /// Default flag for a freshly created node of `kind`
    ///
    /// Boundary nodes (markers and request boundaries) are synthetic and
    /// hidden unless the consumer says otherwise.
    pub fn default_for(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Root | NodeKind::Method => FilterStatus::AlwaysShow,
            NodeKind::Marker | NodeKind::Request => FilterStatus::AlwaysHide,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => FilterStatus::AlwaysShow,
            1 => FilterStatus::Conditional,
            _ => FilterStatus::AlwaysHide,
        }
    }
}

/// Plain-value copy of a node's statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub n_calls: u64,
    pub n_calls_diff: i64,
    pub net_time0: u64,
    pub net_time1: u64,
    pub sleep_time0: u64,
    pub wait_time0: u64,
    pub last_wait_or_sleep_stamp: u64,
    pub filter_status: FilterStatus,
}

/// Atomic statistics block embedded in every node
#[derive(Debug)]
pub struct TimedStats {
    n_calls: AtomicU64,
    n_calls_diff: AtomicI64,
    net_time0: AtomicU64,
    net_time1: AtomicU64,
    sleep_time0: AtomicU64,
    wait_time0: AtomicU64,
    last_wait_or_sleep_stamp: AtomicU64,
    filter_status: AtomicU8,
}

impl TimedStats {
    /// Zeroed statistics with the given filter flag
    pub fn new(filter_status: FilterStatus) -> Self {
        Self {
            n_calls: AtomicU64::new(0),
            n_calls_diff: AtomicI64::new(0),
            net_time0: AtomicU64::new(0),
            net_time1: AtomicU64::new(0),
            sleep_time0: AtomicU64::new(0),
            wait_time0: AtomicU64::new(0),
            last_wait_or_sleep_stamp: AtomicU64::new(0),
            filter_status: AtomicU8::new(filter_status as u8),
        }
    }

    pub fn n_calls(&self) -> u64 {
        self.n_calls.load(Ordering::Relaxed)
    }

    /// Add to the call count, returning the new total
    pub fn add_n_calls(&self, delta: u64) -> u64 {
        add(&self.n_calls, delta)
    }

    pub fn n_calls_diff(&self) -> i64 {
        self.n_calls_diff.load(Ordering::Relaxed)
    }

    /// Add to the diff call count, returning the new total
    pub fn add_n_calls_diff(&self, delta: i64) -> i64 {
        let previous = self
            .n_calls_diff
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                Some(v.saturating_add(delta))
            })
            .unwrap_or_else(|v| v);
        previous.saturating_add(delta)
    }

    pub fn net_time0(&self) -> u64 {
        self.net_time0.load(Ordering::Relaxed)
    }

    pub fn add_net_time0(&self, delta: u64) -> u64 {
        add(&self.net_time0, delta)
    }

    pub fn net_time1(&self) -> u64 {
        self.net_time1.load(Ordering::Relaxed)
    }

    pub fn add_net_time1(&self, delta: u64) -> u64 {
        add(&self.net_time1, delta)
    }

    pub fn sleep_time0(&self) -> u64 {
        self.sleep_time0.load(Ordering::Relaxed)
    }

    pub fn add_sleep_time0(&self, delta: u64) -> u64 {
        add(&self.sleep_time0, delta)
    }

    pub fn wait_time0(&self) -> u64 {
        self.wait_time0.load(Ordering::Relaxed)
    }

    pub fn add_wait_time0(&self, delta: u64) -> u64 {
        add(&self.wait_time0, delta)
    }

    pub fn last_wait_or_sleep_stamp(&self) -> u64 {
        self.last_wait_or_sleep_stamp.load(Ordering::Relaxed)
    }

    /// Record a wait/sleep timestamp, returning the previous one
    pub fn set_last_wait_or_sleep_stamp(&self, stamp: u64) -> u64 {
        self.last_wait_or_sleep_stamp.swap(stamp, Ordering::Relaxed)
    }

    pub fn filter_status(&self) -> FilterStatus {
        FilterStatus::from_u8(self.filter_status.load(Ordering::Relaxed))
    }

    pub fn set_filter_status(&self, status: FilterStatus) {
        self.filter_status.store(status as u8, Ordering::Relaxed);
    }

    /// Copy calls, timers, stamp and filter from `other`; the diff counter
    /// is left untouched
    pub fn copy_timers_from(&self, other: &TimedStats) {
        let store = |dst: &AtomicU64, src: &AtomicU64| {
            dst.store(src.load(Ordering::Relaxed), Ordering::Relaxed)
        };
        store(&self.n_calls, &other.n_calls);
        store(&self.net_time0, &other.net_time0);
        store(&self.net_time1, &other.net_time1);
        store(&self.sleep_time0, &other.sleep_time0);
        store(&self.wait_time0, &other.wait_time0);
        store(&self.last_wait_or_sleep_stamp, &other.last_wait_or_sleep_stamp);
        self.set_filter_status(other.filter_status());
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            n_calls: self.n_calls(),
            n_calls_diff: self.n_calls_diff(),
            net_time0: self.net_time0(),
            net_time1: self.net_time1(),
            sleep_time0: self.sleep_time0(),
            wait_time0: self.wait_time0(),
            last_wait_or_sleep_stamp: self.last_wait_or_sleep_stamp(),
            filter_status: self.filter_status(),
        }
    }
}

/// Saturating add; a counter pinned at `u64::MAX` stays there
fn add(counter: &AtomicU64, delta: u64) -> u64 {
    let previous = counter
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
            Some(v.saturating_add(delta))
        })
        .unwrap_or_else(|v| v);
    previous.saturating_add(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_adders_return_new_total() {
        let stats = TimedStats::new(FilterStatus::AlwaysShow);

        assert_eq!(stats.add_n_calls(1), 1);
        assert_eq!(stats.add_n_calls(4), 5);
        assert_eq!(stats.add_net_time0(100), 100);
        assert_eq!(stats.add_net_time0(50), 150);
        assert_eq!(stats.add_net_time1(7), 7);
        assert_eq!(stats.add_sleep_time0(3), 3);
        assert_eq!(stats.add_wait_time0(9), 9);
        assert_eq!(stats.add_n_calls_diff(-2), -2);
        assert_eq!(stats.add_n_calls_diff(5), 3);
    }

    #[test]
    fn test_adders_saturate_at_max() {
        let stats = TimedStats::new(FilterStatus::AlwaysShow);

        assert_eq!(stats.add_net_time0(u64::MAX), u64::MAX);
        assert_eq!(stats.add_net_time0(5), u64::MAX);
        assert_eq!(stats.net_time0(), u64::MAX);

        stats.add_n_calls(u64::MAX - 1);
        assert_eq!(stats.add_n_calls(10), u64::MAX);

        assert_eq!(stats.add_n_calls_diff(i64::MIN), i64::MIN);
        assert_eq!(stats.add_n_calls_diff(-1), i64::MIN);
    }

    #[test]
    fn test_stamp_swap_returns_previous() {
        let stats = TimedStats::new(FilterStatus::AlwaysShow);
        assert_eq!(stats.set_last_wait_or_sleep_stamp(10), 0);
        assert_eq!(stats.set_last_wait_or_sleep_stamp(25), 10);
        assert_eq!(stats.last_wait_or_sleep_stamp(), 25);
    }

    #[test]
    fn test_filter_defaults_by_kind() {
        assert_eq!(FilterStatus::default_for(NodeKind::Method), FilterStatus::AlwaysShow);
        assert_eq!(FilterStatus::default_for(NodeKind::Root), FilterStatus::AlwaysShow);
        assert_eq!(FilterStatus::default_for(NodeKind::Marker), FilterStatus::AlwaysHide);
        assert_eq!(FilterStatus::default_for(NodeKind::Request), FilterStatus::AlwaysHide);
    }

    #[test]
    fn test_filter_override() {
        let stats = TimedStats::new(FilterStatus::AlwaysHide);
        stats.set_filter_status(FilterStatus::Conditional);
        assert_eq!(stats.filter_status(), FilterStatus::Conditional);
    }

    #[test]
    fn test_copy_timers_keeps_diff() {
        let live = TimedStats::new(FilterStatus::AlwaysShow);
        live.add_n_calls(3);
        live.add_net_time0(30);
        live.add_n_calls_diff(9);

        let copy = TimedStats::new(FilterStatus::AlwaysHide);
        copy.copy_timers_from(&live);

        let snap = copy.snapshot();
        assert_eq!(snap.n_calls, 3);
        assert_eq!(snap.net_time0, 30);
        assert_eq!(snap.n_calls_diff, 0);
        assert_eq!(snap.filter_status, FilterStatus::AlwaysShow);
    }

    #[test]
    fn test_concurrent_adds_are_not_lost() {
        let stats = Arc::new(TimedStats::new(FilterStatus::AlwaysShow));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stats = Arc::clone(&stats);
                thread::spawn(move || {
                    for _ in 0..10_000 {
                        stats.add_n_calls(1);
                        stats.add_net_time0(2);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.n_calls(), 40_000);
        assert_eq!(stats.net_time0(), 80_000);
    }
}
