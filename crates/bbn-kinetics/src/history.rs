use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::integrators::MAX_ORDER;

/// Fixed-capacity ring buffer keeping the most recent values.
///
/// Multi-step solvers only ever look at the last `MAX_ORDER` evaluations, so
/// older entries are dropped as new ones arrive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History<T> {
    capacity: usize,
    entries: VecDeque<T>,
}

impl<T> History<T> {
    /// Creates an empty buffer holding at most `capacity` values.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends a value, evicting the oldest one when full.
    pub fn push(&mut self, value: T) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(value);
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained values.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently pushed value.
    pub fn latest(&self) -> Option<&T> {
        self.entries.back()
    }

    /// Iterates from the newest value to the oldest.
    pub fn newest_first(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter().rev()
    }

    /// Drops every stored value.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(MAX_ORDER)
    }
}
