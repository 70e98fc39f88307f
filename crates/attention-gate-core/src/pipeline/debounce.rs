//! Unanimity-based hysteresis over recent attention samples.

use std::collections::VecDeque;

/// Default history capacity.
pub const DEFAULT_WINDOW: usize = 5;

/// When a partially filled window may report consensus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DebouncePolicy {
    /// Emit as soon as every sample seen so far agrees.
    #[default]
    AgreeSoFar,
    /// Emit only once the window is full and unanimous.
    FullWindow,
}

/// Fixed-capacity FIFO of attention samples.
#[derive(Debug, Clone)]
pub struct Debouncer {
    history: VecDeque<bool>,
    capacity: usize,
    policy: DebouncePolicy,
}

impl Debouncer {
    /// Creates a debouncer. A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize, policy: DebouncePolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            policy,
        }
    }

    /// Appends a sample and reports the consensus, if any.
    ///
    /// Returns `Some(v)` only when every retained sample equals `v`.
    pub fn push(&mut self, sample: bool) -> Option<bool> {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(sample);

        if self.policy == DebouncePolicy::FullWindow && self.history.len() < self.capacity {
            return None;
        }
        self.history
            .iter()
            .all(|&s| s == sample)
            .then_some(sample)
    }

    /// Window capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of retained samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Returns true if no sample has been pushed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DebouncePolicy::default())
    }
}
