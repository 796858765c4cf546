// src/store/mod.rs
//! Vocabulary store: messages, author models and their counters.
//!
//! Everything above this module talks to [`VocabularyStore`] only. Two adapters
//! ship with the crate: [`MemoryStore`] and the snapshot-on-write [`FileStore`].

mod file;
mod memory;
mod state;

pub use file::FileStore;
pub use memory::MemoryStore;
pub(crate) use state::StoreState;

use crate::core::types::{AuthorId, AuthorModel, AuthorStats, Message, MessageId, WordVector};
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode or decode store snapshot: {0}")]
    Codec(#[from] bincode::Error),

    #[error("store snapshot has format version {found}, expected {expected}")]
    IncompatibleSnapshot { found: u32, expected: u32 },

    #[error("unknown author: {0}")]
    UnknownAuthor(AuthorId),

    #[error("unknown message: {0}")]
    UnknownMessage(MessageId),

    #[error("message {message_id} does not belong to author {author_id}")]
    ForeignMessage {
        message_id: MessageId,
        author_id: AuthorId,
    },

    #[error("message {0} is already incorporated")]
    AlreadyIncorporated(MessageId),

    #[error("store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable per-author vocabulary and message bookkeeping.
///
/// Every write either applies completely or leaves the store untouched.
pub trait VocabularyStore: Send + Sync {
    /// Creates an empty model for `author_id`. Returns `false` if it already existed.
    fn register_author(&self, author_id: &str) -> StoreResult<bool>;

    /// Stores a new, not yet incorporated message, creating its author on first sighting.
    /// Returns `false` (and changes nothing) when the id is already stored.
    fn add_message(&self, message: Message) -> StoreResult<bool>;

    /// [`add_message`](Self::add_message) for a whole batch. Returns how many were new.
    fn add_messages(&self, messages: Vec<Message>) -> StoreResult<usize> {
        let mut added = 0;
        for message in messages {
            if self.add_message(message)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Up to `limit` messages of `author_id` that are not incorporated yet, oldest first.
    fn get_pending_messages(&self, author_id: &str, limit: usize) -> StoreResult<Vec<Message>>;

    /// Flags messages as incorporated and bumps their authors' counters.
    fn mark_incorporated(&self, message_ids: &[MessageId]) -> StoreResult<()>;

    /// Adds `vector` to the author's cumulative vocabulary.
    fn merge_vocabulary(&self, author_id: &str, vector: &WordVector) -> StoreResult<()>;

    /// `merge_vocabulary` and `mark_incorporated` as one unit. All `message_ids`
    /// must be pending messages of `author_id`.
    fn incorporate(
        &self,
        author_id: &str,
        vector: &WordVector,
        message_ids: &[MessageId],
    ) -> StoreResult<()>;

    /// Consistent copy of one author's model, `None` for unknown authors.
    fn get_model(&self, author_id: &str) -> StoreResult<Option<AuthorModel>>;

    /// Number of messages stored across all authors.
    fn get_global_message_total(&self) -> StoreResult<u64>;

    /// Every known author in id order.
    fn list_authors(&self) -> StoreResult<Vec<AuthorStats>>;

    fn author_stats(&self, author_id: &str) -> StoreResult<Option<AuthorStats>>;

    /// The author with the fewest stored messages, i.e. the one to fetch next.
    fn author_with_fewest_messages(&self) -> StoreResult<Option<AuthorId>> {
        let authors = self.list_authors()?;
        Ok(authors
            .into_iter()
            .min_by_key(|stats| stats.messages_total)
            .map(|stats| stats.author_id))
    }
}
