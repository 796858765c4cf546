// src/core/mod.rs

pub mod engine;
pub mod filter;
pub mod scorer;
pub mod types;
pub mod vectorizer;
