// File: src/learning.rs
use crate::core::types::{AuthorId, MessageId};
use crate::core::vectorizer::Vectorizer;
use crate::store::{StoreError, StoreResult, VocabularyStore};
use crate::tokenizer::Tokenizer;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Default number of messages learned per `learn` call.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Merges pending messages into author models.
///
/// At most one `learn` per author runs at a time, so two batches never read
/// overlapping pending sets. Different authors do not wait for each other.
#[derive(Default)]
pub struct ModelUpdater {
    author_locks: Mutex<HashMap<AuthorId, Arc<Mutex<()>>>>,
}

impl ModelUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    fn author_lock(&self, author_id: &str) -> StoreResult<Arc<Mutex<()>>> {
        let mut locks = self.author_locks.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(locks.entry(author_id.to_string()).or_default().clone())
    }

    /// Learns up to `max_messages` pending messages of `author_id`.
    /// Returns how many were incorporated; 0 leaves the store untouched.
    pub fn learn<S, T>(
        &self,
        store: &S,
        vectorizer: &Vectorizer<T>,
        author_id: &str,
        max_messages: usize,
    ) -> StoreResult<usize>
    where
        S: VocabularyStore + ?Sized,
        T: Tokenizer,
    {
        if max_messages == 0 {
            return Ok(0);
        }
        let lock = self.author_lock(author_id)?;
        let _guard = lock.lock().map_err(|_| StoreError::Poisoned)?;

        let pending = store.get_pending_messages(author_id, max_messages)?;
        if pending.is_empty() {
            tracing::debug!("Nothing to learn for {}", author_id);
            return Ok(0);
        }

        let batch = pending
            .iter()
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let vector = vectorizer.vectorize(&batch);
        let message_ids: Vec<MessageId> = pending.iter().map(|m| m.id).collect();

        store.incorporate(author_id, &vector, &message_ids)?;
        tracing::info!(
            "Learned {} message(s) for {} ({} distinct word(s))",
            message_ids.len(),
            author_id,
            vector.len()
        );
        Ok(message_ids.len())
    }

    /// Runs [`learn`](Self::learn) for every known author, in id order.
    pub fn learn_all<S, T>(
        &self,
        store: &S,
        vectorizer: &Vectorizer<T>,
        max_messages: usize,
    ) -> StoreResult<Vec<(AuthorId, usize)>>
    where
        S: VocabularyStore + ?Sized,
        T: Tokenizer,
    {
        store
            .list_authors()?
            .into_iter()
            .map(|stats| {
                let learned = self.learn(store, vectorizer, &stats.author_id, max_messages)?;
                Ok((stats.author_id, learned))
            })
            .collect()
    }
}
