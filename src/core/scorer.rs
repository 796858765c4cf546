// src/core/scorer.rs
//! Naive Bayes scoring of text against author models.
//!
//! `text_score = ln P(author) + Σ ln P(word | author)` over every eligible word
//! occurrence. Larger (less negative) scores rank higher; the value is a
//! log-probability up to an author-independent constant, not a calibrated
//! probability.
//!
//! The word likelihood is smoothed against the number of *learned messages*,
//! not the number of learned word occurrences:
//! `(1 + count(word)) / (1 + messages_incorporated)`.

use crate::core::types::{AuthorModel, ClassificationResult};
use crate::core::vectorizer::Vectorizer;
use crate::store::{StoreResult, VocabularyStore};
use crate::tokenizer::Tokenizer;
use std::cmp::Ordering;

/// `messages_total(author) / global_total`, `None` when either is zero.
pub fn author_prior(model: &AuthorModel, global_total: u64) -> Option<f64> {
    if global_total == 0 || model.messages_total == 0 {
        return None;
    }
    Some(model.messages_total as f64 / global_total as f64)
}

/// Laplace-smoothed likelihood of `word` for this author. Always > 0.
pub fn word_likelihood(model: &AuthorModel, word: &str) -> f64 {
    let numerator = 1 + model.word_count(word);
    let denominator = 1 + model.messages_incorporated;
    numerator as f64 / denominator as f64
}

/// Log score of an eligible word stream against one model.
pub fn score_words<S: AsRef<str>>(model: &AuthorModel, global_total: u64, words: &[S]) -> Option<f64> {
    let prior = author_prior(model, global_total)?;
    Some(
        words
            .iter()
            .fold(prior.ln(), |score, word| {
                score + word_likelihood(model, word.as_ref()).ln()
            }),
    )
}

/// Orders results best first. Unscorable authors go last, keeping their relative order.
pub fn order_by_score(results: &mut [ClassificationResult]) {
    results.sort_by(|a, b| match (a.score, b.score) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Store-backed scorer. Reads one consistent model per author per call.
pub struct Scorer<'a, S: ?Sized, T> {
    store: &'a S,
    vectorizer: &'a Vectorizer<T>,
}

impl<'a, S: VocabularyStore + ?Sized, T: Tokenizer> Scorer<'a, S, T> {
    pub fn new(store: &'a S, vectorizer: &'a Vectorizer<T>) -> Self {
        Self { store, vectorizer }
    }

    pub fn author_prior(&self, author_id: &str) -> StoreResult<Option<f64>> {
        let Some(model) = self.store.get_model(author_id)? else {
            return Ok(None);
        };
        let global_total = self.store.get_global_message_total()?;
        Ok(author_prior(&model, global_total))
    }

    /// `None` only for unknown authors.
    pub fn word_likelihood(&self, author_id: &str, word: &str) -> StoreResult<Option<f64>> {
        Ok(self
            .store
            .get_model(author_id)?
            .map(|model| word_likelihood(&model, word)))
    }

    pub fn text_score(&self, author_id: &str, text: &str) -> StoreResult<Option<f64>> {
        let words = self.vectorizer.eligible_words(text);
        let global_total = self.store.get_global_message_total()?;
        self.score_author(author_id, global_total, &words)
    }

    /// Scores `text` for every author in `author_ids`, in the same order.
    /// Unscorable authors are kept with a `None` score.
    pub fn rank<A: AsRef<str>>(&self, text: &str, author_ids: &[A]) -> StoreResult<Vec<ClassificationResult>> {
        let words = self.vectorizer.eligible_words(text);
        let global_total = self.store.get_global_message_total()?;
        tracing::debug!(
            "Ranking {} author(s) on {} eligible word(s)",
            author_ids.len(),
            words.len()
        );

        author_ids
            .iter()
            .map(|author_id| {
                let author_id = author_id.as_ref();
                Ok(ClassificationResult {
                    author_id: author_id.to_string(),
                    score: self.score_author(author_id, global_total, &words)?,
                })
            })
            .collect()
    }

    /// [`rank`](Self::rank) against every author the store knows.
    pub fn rank_all(&self, text: &str) -> StoreResult<Vec<ClassificationResult>> {
        let author_ids: Vec<String> = self
            .store
            .list_authors()?
            .into_iter()
            .map(|stats| stats.author_id)
            .collect();
        self.rank(text, &author_ids)
    }

    fn score_author(&self, author_id: &str, global_total: u64, words: &[String]) -> StoreResult<Option<f64>> {
        Ok(self
            .store
            .get_model(author_id)?
            .and_then(|model| score_words(&model, global_total, words)))
    }
}
