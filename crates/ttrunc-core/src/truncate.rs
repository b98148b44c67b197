//! Prefix truncation under a token budget
//!
//! Two strategies share one contract: the result is the input itself when
//! it already fits, otherwise a prefix ending on a `char` boundary whose
//! token count does not exceed the budget.
//!
//! - `Decode` encodes the whole input, keeps the first N tokens and maps
//!   their decoded text back onto the input.
//! - `Bisect` starts from that decoded prefix and searches upward for the
//!   longest prefix that still fits. It guesses a cut from the tokenizer's
//!   average tokens per character, widens the bounds around the guess and
//!   binary searches between them, so only prefixes near the cut are
//!   encoded. Its result always starts with the `Decode` result.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Result, TokenBudget, Tokenizer};

/// Trailing tokens dropped at most when a decode cut lands inside a character
const MAX_DECODE_BACKOFF: usize = 3;

/// Growth factor used when widening the search bounds
const WIDEN_FACTOR: f64 = 1.1;

/// Fallback ratio for tokenizers that produce no tokens for the sample
const DEFAULT_TOKENS_PER_CHAR: f64 = 0.25;

/// Calibration text for the tokens-per-character estimate
const SAMPLE: &str = "\
Tokenizers split text into pieces that are usually shorter than a word. \
Common English words such as the, and, of, to and in map to a single token, \
while rare words, identifiers like parse_config_v2 or HTTPRequestHandler, \
numbers like 3.14159 and 2024-06-30, and punctuation runs such as ->, :: \
and !== take several. Source code mixes all of these: \
fn main() { let total: usize = items.iter().map(|x| x.len()).sum(); } \
Prose in other languages (naïve café, Straße, 東京, Привет мир) costs more \
tokens per character than plain ASCII.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Encode everything, keep the first N tokens, decode
    Decode,
    /// Extend the decoded prefix to the longest prefix that fits
    #[default]
    Bisect,
}

pub struct Truncator {
    tokenizer: Arc<dyn Tokenizer>,
    strategy: Strategy,
    tokens_per_char: OnceLock<f64>,
}

impl Truncator {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            tokenizer,
            strategy: Strategy::default(),
            tokens_per_char: OnceLock::new(),
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn tokenizer(&self) -> &dyn Tokenizer {
        self.tokenizer.as_ref()
    }

    pub fn count(&self, text: &str) -> usize {
        self.tokenizer.count(text)
    }

    /// Average tokens per character, measured once on a fixed sample
    pub fn tokens_per_char(&self) -> f64 {
        *self.tokens_per_char.get_or_init(|| {
            let chars = SAMPLE.chars().count() as f64;
            let ratio = self.tokenizer.count(SAMPLE) as f64 / chars;
            if ratio > 0.0 {
                ratio
            } else {
                DEFAULT_TOKENS_PER_CHAR
            }
        })
    }

    /// Truncate `text` so it encodes to at most `budget` tokens
    pub fn truncate<'a>(&self, text: &'a str, budget: impl Into<TokenBudget>) -> Result<&'a str> {
        let budget = budget.into().get();
        if budget == 0 || text.is_empty() {
            return Ok("");
        }

        let tokens = self.tokenizer.encode(text);
        if tokens.len() <= budget {
            return Ok(text);
        }

        let decoded = self.decoded_prefix(text, &tokens[..budget]);
        match (self.strategy, decoded) {
            (Strategy::Decode, Some(prefix)) => Ok(prefix),
            (Strategy::Bisect, Some(prefix)) => {
                Ok(self.search(text, budget, prefix.chars().count()))
            }
            (_, None) => Ok(self.search(text, budget, 0)),
        }
    }

    /// Text of the leading `tokens` as a prefix of `text`, if it can be
    /// recovered and re-encodes within `tokens.len()`.
    ///
    /// Drops up to `MAX_DECODE_BACKOFF` trailing tokens when the cut splits
    /// a character.
    fn decoded_prefix<'a>(&self, text: &'a str, tokens: &[u32]) -> Option<&'a str> {
        let budget = tokens.len();
        let mut keep = budget;
        let decoded = loop {
            match self.tokenizer.decode(&tokens[..keep]) {
                Ok(decoded) => break decoded,
                Err(err) if keep > 0 && budget - keep < MAX_DECODE_BACKOFF => {
                    debug!(keep, error = %err, "Decode cut splits a character, backing off");
                    keep -= 1;
                }
                Err(err) => {
                    warn!(
                        tokenizer = self.tokenizer.name(),
                        error = %err,
                        "Cannot decode token prefix, falling back to search"
                    );
                    return None;
                }
            }
        };

        if !text.starts_with(decoded.as_str()) {
            warn!(
                tokenizer = self.tokenizer.name(),
                "Decoded tokens are not a prefix of the input, falling back to search"
            );
            return None;
        }

        // `decoded` is valid UTF-8 and equal to the start of `text`,
        // so its length is a char boundary of `text`.
        let candidate = &text[..decoded.len()];
        if self.tokenizer.count(candidate) > budget {
            debug!(budget, "Decoded prefix re-encodes over budget, falling back to search");
            return None;
        }
        Some(candidate)
    }

    /// Longest prefix of at least `floor` chars whose next char overflows
    /// `budget`.
    ///
    /// Requires `count(floor) <= budget < count(text)`. Prefix counts are not
    /// always monotone under BPE, so the result is a local maximum: it fits
    /// and one more char does not.
    fn search<'a>(&self, text: &'a str, budget: usize, floor: usize) -> &'a str {
        let mut counter = PrefixCounter::new(self.tokenizer.as_ref(), text);
        let len = counter.len();

        let estimate = (budget as f64 / self.tokens_per_char()) as usize;
        let mut low = floor;
        let mut high = estimate.clamp(floor + 1, len);

        // count(len) > budget, so this stops at len at the latest
        while counter.count(high) <= budget {
            low = high;
            high = widen(high).min(len);
        }

        let mut candidate = narrow(high);
        while candidate > low && counter.count(candidate) > budget {
            high = candidate;
            candidate = narrow(candidate);
        }
        if candidate > low {
            low = candidate;
        }

        debug!(low, high, budget, "Searching truncation point");

        // count(low) <= budget < count(high)
        while high - low > 1 {
            let mid = low + (high - low) / 2;
            if counter.count(mid) <= budget {
                low = mid;
            } else {
                high = mid;
            }
        }

        debug!(
            chars = low,
            encodes = counter.encodes(),
            "Truncation point found"
        );
        counter.prefix(low)
    }
}

fn widen(n: usize) -> usize {
    ((n as f64 * WIDEN_FACTOR) as usize).max(n + 1)
}

fn narrow(n: usize) -> usize {
    ((n as f64 / WIDEN_FACTOR) as usize).min(n - 1)
}

/// Memoised token counts of character prefixes of one input
struct PrefixCounter<'t, 'a> {
    tokenizer: &'t dyn Tokenizer,
    text: &'a str,
    /// Byte offset of the end of each char prefix; `bounds[n]` ends `n` chars
    bounds: Vec<usize>,
    counts: HashMap<usize, usize>,
}

impl<'t, 'a> PrefixCounter<'t, 'a> {
    fn new(tokenizer: &'t dyn Tokenizer, text: &'a str) -> Self {
        let bounds = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();

        Self {
            tokenizer,
            text,
            bounds,
            counts: HashMap::new(),
        }
    }

    /// Length of the input in chars
    fn len(&self) -> usize {
        self.bounds.len() - 1
    }

    fn prefix(&self, chars: usize) -> &'a str {
        &self.text[..self.bounds[chars]]
    }

    fn count(&mut self, chars: usize) -> usize {
        if chars == 0 {
            return 0;
        }
        if let Some(&count) = self.counts.get(&chars) {
            return count;
        }
        let count = self.tokenizer.count(self.prefix(chars));
        self.counts.insert(chars, count);
        count
    }

    fn encodes(&self) -> usize {
        self.counts.len()
    }
}
