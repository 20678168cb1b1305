//! The staging list: a capacity-bounded queue of questions awaiting synthesis.

use serde::Serialize;

use crate::models::ExtractedQuestion;

/// Maximum number of staged questions per synthesis.
pub const STAGING_CAPACITY: usize = 6;

/// Result of [`StagingList::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Staged,
    /// At capacity; the list was left unchanged.
    Full,
}

/// Ordered, bounded list of staged questions.
///
/// Overflow policy is reject-and-no-op: once [`STAGING_CAPACITY`] items are
/// staged, further pushes are dropped. Insertion order is display order and
/// there is no single-item removal.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct StagingList {
    items: Vec<ExtractedQuestion>,
}

impl StagingList {
    pub fn new() -> Self {
        Self {
            items: Vec::with_capacity(STAGING_CAPACITY),
        }
    }

    pub fn push(&mut self, item: ExtractedQuestion) -> PushOutcome {
        if self.is_full() {
            tracing::debug!("Staging list full, dropping push");
            return PushOutcome::Full;
        }
        self.items.push(item);
        PushOutcome::Staged
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[ExtractedQuestion] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= STAGING_CAPACITY
    }
}
