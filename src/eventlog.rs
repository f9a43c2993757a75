//! Capacity-bounded, append-only event logs.
//!
//! Appending beyond capacity evicts the oldest entries first, preserving
//! the relative order of the remainder. Reads hand out snapshots so
//! display collaborators never hold the interior lock.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Maximum retained entries for the session-wide log.
pub const SESSION_LOG_CAPACITY: usize = 100;

/// Maximum retained entries for a single workflow run.
pub const WORKFLOW_LOG_CAPACITY: usize = 20;

/// An append-only sequence with FIFO eviction at capacity.
pub struct BoundedLog<T> {
    entries: Mutex<VecDeque<T>>,
    capacity: usize,
}

impl<T: Clone> BoundedLog<T> {
    /// Creates a log retaining at most `capacity` entries.
    ///
    /// A zero capacity is bumped to one so the log always retains the
    /// most recent entry.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.max(1))),
            capacity: capacity.max(1),
        }
    }

    /// Appends an entry, evicting the oldest when full.
    pub fn push(&self, entry: T) {
        let mut entries = self.entries.lock().expect("event log lock poisoned");
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Returns a snapshot of the retained entries in append order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        self.entries
            .lock()
            .expect("event log lock poisoned")
            .iter()
            .cloned()
            .collect()
    }

    /// Returns the number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("event log lock poisoned").len()
    }

    /// Returns whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the configured capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Discards all retained entries.
    pub fn clear(&self) {
        self.entries.lock().expect("event log lock poisoned").clear();
    }
}

impl<T> std::fmt::Debug for BoundedLog<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedLog")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn push_and_snapshot_preserve_order() {
        let log = BoundedLog::new(5);
        for i in 0..3 {
            log.push(i);
        }
        assert_eq!(log.snapshot(), vec![0, 1, 2]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn eviction_drops_oldest_first() {
        let log = BoundedLog::new(3);
        for i in 0..5 {
            log.push(i);
        }
        assert_eq!(log.snapshot(), vec![2, 3, 4]);
    }

    #[test]
    fn zero_capacity_is_bumped_to_one() {
        let log = BoundedLog::new(0);
        log.push("a");
        log.push("b");
        assert_eq!(log.snapshot(), vec!["b"]);
    }

    #[test]
    fn clear_empties_the_log() {
        let log = BoundedLog::new(3);
        log.push(1);
        log.clear();
        assert!(log.is_empty());
    }

    proptest! {
        #[test]
        fn never_exceeds_capacity_and_keeps_suffix(
            capacity in 1usize..50,
            count in 0usize..200,
        ) {
            let log = BoundedLog::new(capacity);
            for i in 0..count {
                log.push(i);
            }
            let snapshot = log.snapshot();
            prop_assert!(snapshot.len() <= capacity);
            // The retained entries are exactly the most recent suffix,
            // in their original relative order.
            let expected: Vec<usize> =
                (count.saturating_sub(capacity)..count).collect();
            prop_assert_eq!(snapshot, expected);
        }
    }
}
