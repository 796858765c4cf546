// src/core/vectorizer.rs
use crate::core::filter::{is_eligible, normalize_word};
use crate::core::types::{Token, WordVector};
use crate::tokenizer::Tokenizer;

/// Turns text into eligible words through a [`Tokenizer`].
///
/// Tokenizer failures are absorbed: the text is treated as having no words.
pub struct Vectorizer<T> {
    tokenizer: T,
}

impl<T: Tokenizer> Vectorizer<T> {
    pub fn new(tokenizer: T) -> Self {
        Self { tokenizer }
    }

    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }

    /// Eligible words of `text` in token order, duplicates included.
    pub fn eligible_words(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let lines = match self.tokenizer.tokenize(text) {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!("Tokenizer unavailable, treating text as empty: {}", e);
                return Vec::new();
            }
        };

        lines
            .into_iter()
            .flatten()
            .filter_map(|token| {
                let token = Token {
                    surface: normalize_word(&token.surface),
                    ..token
                };
                is_eligible(&token).then_some(token.surface)
            })
            .collect()
    }

    /// Word frequencies of `text`. Empty when nothing is eligible.
    pub fn vectorize(&self, text: &str) -> WordVector {
        self.eligible_words(text).into_iter().collect()
    }
}
