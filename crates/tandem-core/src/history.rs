//! Bounded task result history

use crate::types::TaskResult;
use std::collections::VecDeque;

/// Maximum retained results
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Append-only record of completed task results
///
/// Holds the most recent results in insertion order; when full, the oldest
/// entries are evicted first. Entries are never mutated after append.
pub struct HistoryLog {
    entries: VecDeque<TaskResult>,
    capacity: usize,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a result, evicting the oldest entries when over capacity
    pub fn append(&mut self, result: TaskResult) {
        self.entries.push_back(result);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Snapshot of all retained results, oldest first
    pub fn all(&self) -> Vec<TaskResult> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}
