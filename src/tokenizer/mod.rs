// src/tokenizer/mod.rs
//! Morphological tokenizer adapter.
//!
//! The [`Tokenizer`] trait is the only way the rest of the crate reaches a
//! tokenizer. [`MecabTokenizer`] drives an external MeCab-compatible process.
//! Callers treat any [`TokenizeError`] as an empty token stream.

mod mecab;

pub use mecab::MecabTokenizer;

use crate::core::types::Token;
use std::io;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenizeError {
    #[error("failed to start tokenizer `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("tokenizer I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("tokenizer exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("tokenizer produced invalid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Splits text into tagged tokens, one inner sequence per input line.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Result<Vec<Vec<Token>>, TokenizeError>;
}

impl<T: Tokenizer + ?Sized> Tokenizer for Box<T> {
    fn tokenize(&self, text: &str) -> Result<Vec<Vec<Token>>, TokenizeError> {
        (**self).tokenize(text)
    }
}

impl<T: Tokenizer + ?Sized> Tokenizer for &T {
    fn tokenize(&self, text: &str) -> Result<Vec<Vec<Token>>, TokenizeError> {
        (**self).tokenize(text)
    }
}

/// Parses MeCab's default output format.
///
/// Each row is `surface<TAB>pos1,pos2,...`; an `EOS` row closes one input line.
/// Rows that do not yield at least three fields are skipped.
pub fn parse_mecab_output(output: &str) -> Vec<Vec<Token>> {
    let mut lines = Vec::new();
    let mut current = Vec::new();

    for row in output.lines() {
        let row = row.trim_end_matches('\r');
        if row == "EOS" {
            lines.push(std::mem::take(&mut current));
            continue;
        }
        if row.is_empty() {
            continue;
        }

        let mut fields: Vec<&str> = Vec::new();
        if let Some((surface, features)) = row.split_once('\t') {
            fields.push(surface);
            fields.extend(features.split(',').filter(|f| !f.is_empty()));
        }
        match Token::from_fields(&fields[..]) {
            Some(token) => current.push(token),
            None => tracing::trace!("Skipping malformed tokenizer row: {:?}", row),
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
