//! Fixed-capacity trailing window of log lines.

use std::collections::VecDeque;

const MAX_PREALLOCATED: usize = 4096;

/// Retains only the most recent `capacity` lines, evicting the oldest first.
///
/// The length never exceeds the capacity, not even transiently: eviction
/// happens before the new line is pushed.
#[derive(Debug, Clone)]
pub struct LogWindow {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LogWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(MAX_PREALLOCATED)),
            capacity,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        while self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Lines in `[start, end)`, clamped to the current length.
    pub fn slice(&self, start: usize, end: usize) -> impl Iterator<Item = &str> {
        let end = end.min(self.lines.len());
        let start = start.min(end);
        self.lines.range(start..end).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}
