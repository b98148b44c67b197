use anyhow::{Result, bail};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use ttrunc_config::Config;
use ttrunc_core::{EncodingRef, Strategy, TokenBudget};
use ttrunc_tokens::truncator_for;

use crate::cli::{EncodingArgs, StrategyArg};
use crate::commands::{read_input, resolve_encoding};

pub fn handle(
    file: Option<PathBuf>,
    encoding_args: EncodingArgs,
    max_tokens: Option<i64>,
    strategy: Option<StrategyArg>,
    config: &Config,
) -> Result<()> {
    let encoding = resolve_encoding(&encoding_args, config)?;
    let budget = resolve_budget(&encoding, max_tokens, config)?;
    let strategy = strategy.map(Strategy::from).unwrap_or(config.strategy);

    let text = read_input(file.as_deref())?;
    let truncated = truncate_text(&text, &encoding, budget, strategy)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(truncated.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Explicit `--max-tokens` wins; otherwise the model's limit from the table
fn resolve_budget(
    encoding: &EncodingRef,
    max_tokens: Option<i64>,
    config: &Config,
) -> Result<TokenBudget> {
    match (max_tokens, encoding) {
        (Some(max_tokens), _) => Ok(TokenBudget::new(max_tokens)?),
        (None, EncodingRef::Model(model)) => Ok(config.model_limits().budget_for(model)?),
        (None, EncodingRef::Encoding(name)) => {
            bail!("--max-tokens is required when truncating with encoding {name}")
        }
    }
}

fn truncate_text(
    text: &str,
    encoding: &EncodingRef,
    budget: TokenBudget,
    strategy: Strategy,
) -> Result<String> {
    let truncator = truncator_for(encoding, strategy)?;
    let truncated = truncator.truncate(text, budget)?;

    info!(
        tokenizer = truncator.tokenizer().name(),
        strategy = ?truncator.strategy(),
        budget = budget.get(),
        input_bytes = text.len(),
        output_bytes = truncated.len(),
        "Truncated input"
    );
    Ok(truncated.to_owned())
}
