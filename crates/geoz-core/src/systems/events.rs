//! Turn events and the bounded event log shown to the player.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Default number of messages the log keeps
pub const DEFAULT_LOG_CAPACITY: usize = 50;

/// Which kind of actor produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Deaths by infection, game over
    General,
    Attackers,
    Defenders,
    Producers,
    Scientists,
    Medics,
    Spitter,
    Crusher,
    Fast,
    /// Player commands and save/load notices
    Player,
}

/// One discrete thing that happened during a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimEvent {
    pub category: EventCategory,
    pub message: String,
}

impl SimEvent {
    pub fn new(category: EventCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

/// Append-only message log that evicts the oldest entries past capacity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    entries: VecDeque<SimEvent>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, event: SimEvent) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = SimEvent>) {
        for event in events {
            self.push(event);
        }
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.entries.iter()
    }

    /// The most recent `n` events, newest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &SimEvent> {
        self.entries.iter().rev().take(n)
    }

    pub fn contains_message(&self, needle: &str) -> bool {
        self.entries.iter().any(|e| e.message.contains(needle))
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

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}
