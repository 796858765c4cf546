// src/store/memory.rs
use super::{StoreError, StoreResult, StoreState, VocabularyStore};
use crate::core::types::{AuthorModel, AuthorStats, Message, MessageId, WordVector};
use std::sync::{Mutex, MutexGuard};

/// Volatile store. Every call runs under a single lock, so writes are atomic
/// with respect to readers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl VocabularyStore for MemoryStore {
    fn register_author(&self, author_id: &str) -> StoreResult<bool> {
        Ok(self.lock()?.register_author(author_id))
    }

    fn add_message(&self, message: Message) -> StoreResult<bool> {
        Ok(self.lock()?.add_message(message))
    }

    fn get_pending_messages(&self, author_id: &str, limit: usize) -> StoreResult<Vec<Message>> {
        Ok(self.lock()?.pending(author_id, limit))
    }

    fn mark_incorporated(&self, message_ids: &[MessageId]) -> StoreResult<()> {
        self.lock()?.mark_incorporated(message_ids)
    }

    fn merge_vocabulary(&self, author_id: &str, vector: &WordVector) -> StoreResult<()> {
        self.lock()?.merge_vocabulary(author_id, vector)
    }

    fn incorporate(
        &self,
        author_id: &str,
        vector: &WordVector,
        message_ids: &[MessageId],
    ) -> StoreResult<()> {
        self.lock()?.incorporate(author_id, vector, message_ids)
    }

    fn get_model(&self, author_id: &str) -> StoreResult<Option<AuthorModel>> {
        Ok(self.lock()?.model(author_id))
    }

    fn get_global_message_total(&self) -> StoreResult<u64> {
        Ok(self.lock()?.global_total())
    }

    fn list_authors(&self) -> StoreResult<Vec<AuthorStats>> {
        Ok(self.lock()?.list_stats())
    }

    fn author_stats(&self, author_id: &str) -> StoreResult<Option<AuthorStats>> {
        Ok(self.lock()?.stats(author_id))
    }
}
