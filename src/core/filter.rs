// src/core/filter.rs
//! Decides which tokens count as vocabulary words.
//!
//! Only common nouns longer than one character survive. Pure ASCII
//! alphanumerics (URLs, numbers, ids) are dropped.

use crate::core::types::Token;
use regex::Regex;
use std::sync::OnceLock;

/// Part-of-speech tag for nouns (IPADIC).
pub const NOUN: &str = "名詞";
/// Secondary part-of-speech tag for general nouns (IPADIC).
pub const GENERAL: &str = "一般";

static ALPHANUMERIC: OnceLock<Regex> = OnceLock::new();

fn alphanumeric() -> &'static Regex {
    ALPHANUMERIC.get_or_init(|| Regex::new(r"(?i)^[a-z0-9]+$").unwrap())
}

/// Case/width normalization applied to every surface form before it is counted.
/// Full-width ASCII becomes half-width, the ideographic space becomes a space,
/// and letters are lowercased.
pub fn normalize_word(surface: &str) -> String {
    surface
        .chars()
        .map(|c| match c {
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            '\u{3000}' => ' ',
            _ => c,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether a token is a classification-eligible word.
///
/// Part-of-speech fields are matched by substring, so proper nouns (固有名詞) pass too.
pub fn is_eligible(token: &Token) -> bool {
    if alphanumeric().is_match(&token.surface) {
        return false;
    }
    if token.surface.chars().count() <= 1 {
        return false;
    }
    token.pos_primary.contains(NOUN)
        && (token.pos_secondary.contains(NOUN) || token.pos_secondary.contains(GENERAL))
}
