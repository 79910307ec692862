//! Bounded pipeline history, kept for introspection only

use selph_core::{Envelope, MessageKind};
use std::collections::VecDeque;
use uuid::Uuid;

pub const DEFAULT_HISTORY_CAPACITY: usize = 500;

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Envelope>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, envelope: Envelope) {
        self.entries.push_back(envelope);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn find(&self, correlation_id: Uuid) -> Option<&Envelope> {
        self.entries.iter().find(|e| e.correlation_id == correlation_id)
    }

    pub fn by_kind(&self, kind: MessageKind) -> impl Iterator<Item = &Envelope> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    pub fn latest(&self) -> Option<&Envelope> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Envelope> {
        self.entries.iter()
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
