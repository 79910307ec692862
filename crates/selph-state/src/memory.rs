//! SignalMemory — bounded FIFO store of weighted signals
//!
//! Insertion order is preserved and never changes on read. When full, the
//! oldest signal is evicted.

use selph_core::Signal;
use std::collections::VecDeque;

pub const DEFAULT_SIGNAL_CAPACITY: usize = 50;

#[derive(Debug, Clone)]
pub struct SignalMemory {
    signals: VecDeque<Signal>,
    capacity: usize,
}

impl Default for SignalMemory {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNAL_CAPACITY)
    }
}

impl SignalMemory {
    /// A capacity of zero is bumped to one so the store can always hold the latest signal.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            signals: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn register(&mut self, signal: Signal) {
        self.signals.push_back(signal);
        while self.signals.len() > self.capacity {
            self.signals.pop_front();
        }
    }

    /// Signal with maximal strength. On ties the later-inserted one wins.
    pub fn strongest(&self) -> Option<&Signal> {
        self.signals.iter().fold(None, |best: Option<&Signal>, s| match best {
            Some(b) if b.strength > s.strength => Some(b),
            _ => Some(s),
        })
    }

    /// The `n` most recent signals, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Signal> {
        let skip = self.signals.len().saturating_sub(n);
        self.signals.iter().skip(skip)
    }

    pub fn average_strength(&self) -> f64 {
        if self.signals.is_empty() {
            return 0.0;
        }
        self.signals.iter().map(|s| s.strength).sum::<f64>() / self.signals.len() as f64
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
