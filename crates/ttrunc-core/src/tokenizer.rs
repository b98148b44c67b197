//! Tokenizer capability
//!
//! The truncator never talks to a vocabulary directly. Anything that can
//! encode text to token ids and decode ids back can be plugged in.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::{Result, TruncateError};

pub trait Tokenizer: Send + Sync {
    /// Name of the vocabulary, used in logs
    fn name(&self) -> &str;

    fn encode(&self, text: &str) -> Vec<u32>;

    /// Decode token ids back to text. Fails when the ids do not form
    /// valid UTF-8 (for example a cut through a multi-byte character).
    fn decode(&self, tokens: &[u32]) -> Result<String>;

    fn count(&self, text: &str) -> usize {
        self.encode(text).len()
    }
}

/// Word-level tokenizer: every run of whitespace plus the word that
/// follows it is one token.
///
/// Ids are assigned on first sight, so the vocabulary grows with use.
#[derive(Debug, Default)]
pub struct WhitespaceTokenizer {
    vocab: Mutex<Vocab>,
}

#[derive(Debug, Default)]
struct Vocab {
    ids: HashMap<String, u32>,
    pieces: Vec<String>,
}

impl WhitespaceTokenizer {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Split into `[whitespace*][non-whitespace*]` pieces
fn pieces(text: &str) -> impl Iterator<Item = &str> {
    let mut start = 0;
    let mut prev_is_word = false;
    let mut boundaries = Vec::new();

    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() && prev_is_word {
            boundaries.push(start..i);
            start = i;
        }
        prev_is_word = !ch.is_whitespace();
    }
    if start < text.len() {
        boundaries.push(start..text.len());
    }

    boundaries.into_iter().map(move |range| &text[range])
}

impl Tokenizer for WhitespaceTokenizer {
    fn name(&self) -> &str {
        "whitespace"
    }

    fn encode(&self, text: &str) -> Vec<u32> {
        let mut vocab = self.vocab.lock().unwrap_or_else(PoisonError::into_inner);
        pieces(text)
            .map(|piece| {
                if let Some(&id) = vocab.ids.get(piece) {
                    return id;
                }
                let id = vocab.pieces.len() as u32;
                vocab.pieces.push(piece.to_string());
                vocab.ids.insert(piece.to_string(), id);
                id
            })
            .collect()
    }

    fn decode(&self, tokens: &[u32]) -> Result<String> {
        let vocab = self.vocab.lock().unwrap_or_else(PoisonError::into_inner);
        tokens
            .iter()
            .map(|&id| {
                vocab
                    .pieces
                    .get(id as usize)
                    .map(String::as_str)
                    .ok_or_else(|| TruncateError::Decode(format!("unknown token id {id}")))
            })
            .collect()
    }

    fn count(&self, text: &str) -> usize {
        pieces(text).count()
    }
}
