use std::collections::HashMap;

use crate::models::{LocalId, PreviewId};

#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub text: String,
    pub preview: Option<PreviewId>,
}

#[derive(Debug, Default)]
pub struct PendingRegistry {
    entries: HashMap<LocalId, PendingEntry>,
}

impl PendingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` and leaves the existing entry alone if `local_id` is already pending.
    pub fn begin(&mut self, local_id: LocalId, text: String, preview: Option<PreviewId>) -> bool {
        if self.entries.contains_key(&local_id) {
            tracing::error!("Send {} is already pending", local_id);
            return false;
        }
        self.entries.insert(local_id, PendingEntry { text, preview });
        true
    }

    pub fn end(&mut self, local_id: LocalId) -> Option<PendingEntry> {
        self.entries.remove(&local_id)
    }

    pub fn is_pending(&self, local_id: LocalId) -> bool {
        self.entries.contains_key(&local_id)
    }

    pub fn get(&self, local_id: LocalId) -> Option<&PendingEntry> {
        self.entries.get(&local_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
