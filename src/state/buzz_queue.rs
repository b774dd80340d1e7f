use indexmap::IndexSet;
use thiserror::Error;

use crate::state::registry::ParticipantRegistry;

/// Reasons a buzz does not earn a queue slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuzzRejected {
    /// The name is not held by any live participant.
    #[error("`{0}` is not a claimed participant")]
    UnknownParticipant(String),
    /// The participant already has a slot for this question.
    #[error("`{0}` already buzzed")]
    AlreadyQueued(String),
}

/// Signal-in order for the current question: FIFO, one slot per name.
#[derive(Debug, Default, Clone)]
pub struct BuzzQueue {
    entries: IndexSet<String>,
}

impl BuzzQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name` at the end of the queue.
    ///
    /// Membership is checked against `registry` at insertion time; entries are not
    /// revisited when the participant later leaves.
    pub fn append(
        &mut self,
        registry: &ParticipantRegistry,
        name: &str,
    ) -> Result<usize, BuzzRejected> {
        if !registry.contains(name) {
            return Err(BuzzRejected::UnknownParticipant(name.to_owned()));
        }
        let (position, inserted) = self.entries.insert_full(name.to_owned());
        if !inserted {
            return Err(BuzzRejected::AlreadyQueued(name.to_owned()));
        }
        Ok(position)
    }

    /// Remove and return the earliest entry.
    pub fn pop_front(&mut self) -> Option<String> {
        self.entries.shift_remove_index(0)
    }

    /// Empty the queue.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Ordered copy of the queue, earliest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    /// Current leader, if anyone buzzed.
    pub fn front(&self) -> Option<&str> {
        self.entries.first().map(String::as_str)
    }

    /// Number of queued participants.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nobody is queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
