//! Token truncation using tiktoken

pub mod tiktoken;

use std::sync::Arc;

use tracing::debug;
use ttrunc_core::{EncodingRef, ModelLimits, Result, Strategy, TokenBudget, Truncator};

pub use tiktoken::{TiktokenTokenizer, encoding_for_model};

/// Truncate `text` to at most `max_tokens` tokens of `encoding`.
///
/// Keeps the first `max_tokens` tokens and decodes them. Negative budgets
/// fail with `InvalidArgument` before any vocabulary is loaded.
pub fn truncate(text: &str, max_tokens: i64, encoding: &EncodingRef) -> Result<String> {
    let budget = TokenBudget::new(max_tokens)?;
    let truncator = truncator_for(encoding, Strategy::Decode)?;
    Ok(truncator.truncate(text, budget)?.to_owned())
}

/// Truncate `text` to the input limit of `model` as listed in `limits`.
///
/// Uses the bisection search, which only encodes prefixes around the cut.
pub fn truncate_to_model_limit(text: &str, model: &str, limits: &ModelLimits) -> Result<String> {
    let budget = limits.budget_for(model)?;
    let truncator = truncator_for(&EncodingRef::model(model), Strategy::Bisect)?;
    let truncated = truncator.truncate(text, budget)?;

    debug!(
        model,
        budget = budget.get(),
        input_bytes = text.len(),
        output_bytes = truncated.len(),
        "Truncated to model limit"
    );
    Ok(truncated.to_owned())
}

/// Number of tokens `text` encodes to under `encoding`
pub fn count_tokens(text: &str, encoding: &EncodingRef) -> Result<usize> {
    Ok(TiktokenTokenizer::for_ref(encoding)?.estimate(text))
}

/// A `Truncator` over the tiktoken vocabulary named by `encoding`
pub fn truncator_for(encoding: &EncodingRef, strategy: Strategy) -> Result<Truncator> {
    let tokenizer = TiktokenTokenizer::for_ref(encoding)?;
    Ok(Truncator::new(Arc::new(tokenizer)).with_strategy(strategy))
}
