// src/error.rs
use crate::config::ConfigError;
use crate::store::StoreError;
use crate::tokenizer::TokenizeError;
use thiserror::Error;

/// Root error type of the crate.
///
/// Tokenizer failures never reach callers of `vectorize`, `learn` or `rank`
/// (they degrade to an empty word stream); the variant exists for callers that
/// drive a [`Tokenizer`](crate::tokenizer::Tokenizer) directly.
#[derive(Error, Debug)]
pub enum BayesError {
    #[error("storage unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("tokenization unavailable: {0}")]
    Tokenize(#[from] TokenizeError),
}

pub type BayesResult<T> = Result<T, BayesError>;
