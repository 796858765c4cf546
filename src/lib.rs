// src/lib.rs
//! Naive Bayes authorship classifier.
//!
//! Messages are tokenized into common nouns, merged into per-author vocabulary
//! models, and new text is scored against every model.

pub mod config;
pub mod core;
pub mod error;
pub mod learning;
mod persistence;
pub mod store;
pub mod tokenizer;

pub use crate::core::engine::BayesEngine;
pub use crate::core::types::{
    AuthorId, AuthorModel, AuthorStats, ClassificationResult, Message, MessageId, Token, WordVector,
};
pub use error::{BayesError, BayesResult};
