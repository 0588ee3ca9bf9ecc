//! Bounded linear undo stack.
//!
//! Entries are whole-state snapshots taken immediately before a mutation.
//! Pushing past capacity evicts the oldest entry; undo pops exactly one.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

/// FIFO-evicting stack of snapshots.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: VecDeque<T>,
    max: usize,
}

impl<T> History<T> {
    /// Create an empty history holding at most `max` entries (at least one).
    #[must_use]
    pub fn new(max: usize) -> Self {
        let max = max.max(1);
        Self { entries: VecDeque::with_capacity(max), max }
    }

    /// Record a snapshot, evicting the oldest when full.
    pub fn push(&mut self, snapshot: T) {
        if self.entries.len() == self.max {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    /// Remove and return the most recent snapshot.
    pub fn pop(&mut self) -> Option<T> {
        self.entries.pop_back()
    }

    /// Drop every snapshot.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained snapshots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.max
    }
}
