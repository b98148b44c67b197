//! Core truncation logic for ttrunc
//!
//! This crate contains:
//! - The `Tokenizer` capability the truncator is written against
//! - `Truncator` (decode and bisection strategies)
//! - Budgets, encoding references and the model limit table

pub mod budget;
pub mod encoding;
pub mod error;
pub mod models;
pub mod tokenizer;
pub mod truncate;

pub use budget::TokenBudget;
pub use encoding::EncodingRef;
pub use error::{Result, TruncateError};
pub use models::{ModelLimit, ModelLimits};
pub use tokenizer::{Tokenizer, WhitespaceTokenizer};
pub use truncate::{Strategy, Truncator};
