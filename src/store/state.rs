// src/store/state.rs
use super::{StoreError, StoreResult};
use crate::core::types::{AuthorId, AuthorModel, AuthorStats, Message, MessageId, WordVector};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// The whole store content. Shared by both adapters and serialized as-is by the file store.
///
/// Mutating methods validate their input before touching anything, so a
/// returned error always means nothing changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreState {
    authors: BTreeMap<AuthorId, AuthorModel>,
    messages: BTreeMap<MessageId, Message>,
}

impl StoreState {
    pub(crate) fn register_author(&mut self, author_id: &str) -> bool {
        if self.authors.contains_key(author_id) {
            return false;
        }
        self.authors
            .insert(author_id.to_string(), AuthorModel::new(author_id));
        true
    }

    pub(crate) fn add_message(&mut self, mut message: Message) -> bool {
        if self.messages.contains_key(&message.id) {
            return false;
        }
        // words of a new message are never in the vocabulary yet
        message.incorporated = false;
        self.register_author(&message.author_id);
        if let Some(model) = self.authors.get_mut(&message.author_id) {
            model.messages_total += 1;
        }
        self.messages.insert(message.id, message);
        true
    }

    pub(crate) fn pending(&self, author_id: &str, limit: usize) -> Vec<Message> {
        self.messages
            .values()
            .filter(|m| m.author_id == author_id && !m.incorporated)
            .take(limit)
            .cloned()
            .collect()
    }

    pub(crate) fn mark_incorporated(&mut self, message_ids: &[MessageId]) -> StoreResult<()> {
        self.check_pending(message_ids, None)?;
        for id in message_ids {
            if let Some(message) = self.messages.get_mut(id) {
                message.incorporated = true;
                if let Some(model) = self.authors.get_mut(&message.author_id) {
                    model.messages_incorporated += 1;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn merge_vocabulary(&mut self, author_id: &str, vector: &WordVector) -> StoreResult<()> {
        let model = self
            .authors
            .get_mut(author_id)
            .ok_or_else(|| StoreError::UnknownAuthor(author_id.to_string()))?;
        model.vocabulary.merge(vector);
        Ok(())
    }

    pub(crate) fn incorporate(
        &mut self,
        author_id: &str,
        vector: &WordVector,
        message_ids: &[MessageId],
    ) -> StoreResult<()> {
        if !self.authors.contains_key(author_id) {
            return Err(StoreError::UnknownAuthor(author_id.to_string()));
        }
        self.check_pending(message_ids, Some(author_id))?;
        self.merge_vocabulary(author_id, vector)?;
        self.mark_incorporated(message_ids)
    }

    /// Every id must exist, be pending, appear once, and (if given) belong to `author_id`.
    fn check_pending(&self, message_ids: &[MessageId], author_id: Option<&str>) -> StoreResult<()> {
        let mut seen = HashSet::with_capacity(message_ids.len());
        for id in message_ids {
            let message = self
                .messages
                .get(id)
                .ok_or(StoreError::UnknownMessage(*id))?;
            if let Some(author_id) = author_id {
                if message.author_id != author_id {
                    return Err(StoreError::ForeignMessage {
                        message_id: *id,
                        author_id: author_id.to_string(),
                    });
                }
            }
            if message.incorporated || !seen.insert(*id) {
                return Err(StoreError::AlreadyIncorporated(*id));
            }
        }
        Ok(())
    }

    pub(crate) fn model(&self, author_id: &str) -> Option<AuthorModel> {
        self.authors.get(author_id).cloned()
    }

    pub(crate) fn global_total(&self) -> u64 {
        self.authors.values().map(|m| m.messages_total).sum()
    }

    pub(crate) fn stats(&self, author_id: &str) -> Option<AuthorStats> {
        let model = self.authors.get(author_id)?;
        let mut ids = self
            .messages
            .values()
            .filter(|m| m.author_id == author_id)
            .map(|m| m.id);
        // messages are keyed by id, so the first match is the minimum
        let min_message_id = ids.next();
        let max_message_id = ids.last().or(min_message_id);

        Some(AuthorStats {
            author_id: model.author_id.clone(),
            messages_total: model.messages_total,
            messages_incorporated: model.messages_incorporated,
            vocabulary_size: model.vocabulary.len(),
            min_message_id,
            max_message_id,
        })
    }

    pub(crate) fn list_stats(&self) -> Vec<AuthorStats> {
        self.authors
            .keys()
            .filter_map(|author_id| self.stats(author_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(messages: &[(MessageId, &str)]) -> StoreState {
        let mut state = StoreState::default();
        for &(id, author) in messages {
            state.add_message(Message::new(id, author, format!("text {id}")));
        }
        state
    }

    #[test]
    fn add_message_creates_author_and_ignores_duplicates() {
        let mut state = StoreState::default();
        assert!(state.add_message(Message::new(1, "alice", "a")));
        assert!(!state.add_message(Message::new(1, "alice", "again")));
        let model = state.model("alice").unwrap();
        assert_eq!(model.messages_total, 1);
        assert_eq!(model.messages_incorporated, 0);
    }

    #[test]
    fn new_messages_always_start_pending() {
        let mut state = StoreState::default();
        let mut message = Message::new(1, "alice", "a");
        message.incorporated = true;
        state.add_message(message);
        assert_eq!(state.pending("alice", 10).len(), 1);
    }

    #[test]
    fn pending_respects_limit_and_author() {
        let state = state_with(&[(3, "alice"), (1, "alice"), (2, "bob"), (4, "alice")]);
        let pending: Vec<MessageId> = state.pending("alice", 2).iter().map(|m| m.id).collect();
        assert_eq!(pending, vec![1, 3]);
    }

    #[test]
    fn incorporate_rejects_foreign_and_repeated_messages() {
        let mut state = state_with(&[(1, "alice"), (2, "bob")]);
        let vector: WordVector = ["子猫"].into_iter().collect();

        let err = state.incorporate("alice", &vector, &[1, 2]).unwrap_err();
        assert!(matches!(err, StoreError::ForeignMessage { message_id: 2, .. }));
        let err = state.incorporate("alice", &vector, &[1, 1]).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyIncorporated(1)));
        // nothing was applied by the failed attempts
        assert!(state.model("alice").unwrap().vocabulary.is_empty());
        assert_eq!(state.pending("alice", 10).len(), 1);

        state.incorporate("alice", &vector, &[1]).unwrap();
        let err = state.incorporate("alice", &vector, &[1]).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyIncorporated(1)));
        assert_eq!(state.model("alice").unwrap().word_count("子猫"), 1);
    }

    #[test]
    fn duplicate_late_in_a_long_batch_is_caught() {
        let ids: Vec<MessageId> = (1..=500).collect();
        let messages: Vec<(MessageId, &str)> = ids.iter().map(|&id| (id, "alice")).collect();
        let mut state = state_with(&messages);
        let mut batch = ids.clone();
        batch.push(250);

        let err = state.incorporate("alice", &WordVector::new(), &batch).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyIncorporated(250)));
        assert_eq!(state.model("alice").unwrap().messages_incorporated, 0);
    }

    #[test]
    fn incorporate_unknown_author_fails() {
        let mut state = StoreState::default();
        let err = state.incorporate("nobody", &WordVector::new(), &[]).unwrap_err();
        assert!(matches!(err, StoreError::UnknownAuthor(_)));
    }

    #[test]
    fn stats_report_id_range() {
        let state = state_with(&[(30, "alice"), (10, "alice"), (20, "bob")]);
        let alice = state.stats("alice").unwrap();
        assert_eq!(alice.min_message_id, Some(10));
        assert_eq!(alice.max_message_id, Some(30));
        let bob = state.stats("bob").unwrap();
        assert_eq!(bob.min_message_id, Some(20));
        assert_eq!(bob.max_message_id, Some(20));
        assert_eq!(state.global_total(), 3);
    }

    #[test]
    fn registered_author_without_messages_has_no_range() {
        let mut state = StoreState::default();
        assert!(state.register_author("carol"));
        assert!(!state.register_author("carol"));
        let stats = state.stats("carol").unwrap();
        assert_eq!(stats.min_message_id, None);
        assert_eq!(stats.max_message_id, None);
    }
}
