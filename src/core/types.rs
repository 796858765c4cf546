// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier of an author (e.g. a screen name).
pub type AuthorId = String;

/// Unique identifier of a message. Larger ids are newer messages.
pub type MessageId = u64;

/// One morpheme as reported by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub surface: String,
    pub pos_primary: String,
    pub pos_secondary: String,
}

impl Token {
    pub fn new(
        surface: impl Into<String>,
        pos_primary: impl Into<String>,
        pos_secondary: impl Into<String>,
    ) -> Self {
        Self {
            surface: surface.into(),
            pos_primary: pos_primary.into(),
            pos_secondary: pos_secondary.into(),
        }
    }

    /// Builds a token from raw tokenizer fields (surface first, then part-of-speech columns).
    /// Rows with fewer than three fields are malformed and yield `None`.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Option<Self> {
        match fields {
            [surface, primary, secondary, ..] => Some(Self::new(
                surface.as_ref(),
                primary.as_ref(),
                secondary.as_ref(),
            )),
            _ => None,
        }
    }
}

/// Word -> occurrence count for one batch of text.
/// Also used as the cumulative vocabulary of an [`AuthorModel`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordVector {
    counts: HashMap<String, u64>,
}

impl WordVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one more occurrence of `word`.
    pub fn add(&mut self, word: &str) {
        self.add_count(word, 1);
    }

    pub fn add_count(&mut self, word: &str, count: u64) {
        if count == 0 {
            return;
        }
        match self.counts.get_mut(word) {
            Some(existing) => *existing += count,
            None => {
                self.counts.insert(word.to_string(), count);
            }
        }
    }

    /// Additive merge: absent words are inserted, present words are incremented.
    pub fn merge(&mut self, other: &WordVector) {
        for (word, &count) in &other.counts {
            self.add_count(word, count);
        }
    }

    /// Count for `word`, 0 when absent.
    pub fn get(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(word, &count)| (word.as_str(), count))
    }

    /// Entries sorted by descending count, then by word.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

impl<S: AsRef<str>> FromIterator<S> for WordVector {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut vector = WordVector::new();
        for word in iter {
            vector.add(word.as_ref());
        }
        vector
    }
}

/// Per-author language model built from incorporated messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorModel {
    pub author_id: AuthorId,
    pub vocabulary: WordVector,
    /// Every message stored for this author, learned or not.
    pub messages_total: u64,
    /// Messages whose words are already merged into `vocabulary`.
    pub messages_incorporated: u64,
}

impl AuthorModel {
    pub fn new(author_id: impl Into<AuthorId>) -> Self {
        Self {
            author_id: author_id.into(),
            vocabulary: WordVector::new(),
            messages_total: 0,
            messages_incorporated: 0,
        }
    }

    pub fn word_count(&self, word: &str) -> u64 {
        self.vocabulary.get(word)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub author_id: AuthorId,
    pub text: String,
    pub incorporated: bool,
}

impl Message {
    /// A message that has not been learned yet.
    pub fn new(id: MessageId, author_id: impl Into<AuthorId>, text: impl Into<String>) -> Self {
        Self {
            id,
            author_id: author_id.into(),
            text: text.into(),
            incorporated: false,
        }
    }
}

/// Score of one author for one classification request.
/// `score` is `None` when the author cannot be scored (no messages yet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub author_id: AuthorId,
    pub score: Option<f64>,
}

impl ClassificationResult {
    pub fn is_scorable(&self) -> bool {
        self.score.is_some()
    }
}

/// Overview of one author as kept by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorStats {
    pub author_id: AuthorId,
    pub messages_total: u64,
    pub messages_incorporated: u64,
    pub vocabulary_size: usize,
    /// Oldest stored message, the paging cursor for fetching older history.
    pub min_message_id: Option<MessageId>,
    /// Newest stored message, the paging cursor for fetching newer history.
    pub max_message_id: Option<MessageId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_from_fields_requires_three_fields() {
        assert_eq!(Token::from_fields(&["EOS"]), None);
        assert_eq!(Token::from_fields(&["子猫", "名詞"]), None);
        let token = Token::from_fields(&["子猫", "名詞", "一般", "*", "*"]).unwrap();
        assert_eq!(token, Token::new("子猫", "名詞", "一般"));
    }

    #[test]
    fn word_vector_counts_occurrences() {
        let vector: WordVector = ["子猫", "子犬", "子猫"].into_iter().collect();
        assert_eq!(vector.get("子猫"), 2);
        assert_eq!(vector.get("子犬"), 1);
        assert_eq!(vector.get("小鳥"), 0);
        assert_eq!(vector.len(), 2);
        assert_eq!(vector.total(), 3);
    }

    #[test]
    fn word_vector_merge_is_additive() {
        let mut a: WordVector = ["子猫", "子犬"].into_iter().collect();
        let b: WordVector = ["子猫", "小鳥", "小鳥"].into_iter().collect();
        let expected_total = a.total() + b.total();

        a.merge(&b);
        assert_eq!(a.get("子猫"), 2);
        assert_eq!(a.get("子犬"), 1);
        assert_eq!(a.get("小鳥"), 2);
        assert_eq!(a.total(), expected_total);
    }

    #[test]
    fn word_vector_ignores_zero_counts() {
        let mut vector = WordVector::new();
        vector.add_count("子猫", 0);
        assert!(vector.is_empty());
    }

    #[test]
    fn sorted_orders_by_count_then_word() {
        let vector: WordVector = ["b語", "a語", "b語", "c語"].into_iter().collect();
        assert_eq!(vector.sorted(), vec![("b語", 2), ("a語", 1), ("c語", 1)]);
    }
}
