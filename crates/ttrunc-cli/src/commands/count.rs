use anyhow::Result;
use std::path::PathBuf;
use ttrunc_config::Config;
use ttrunc_core::EncodingRef;
use ttrunc_tokens::count_tokens;

use crate::cli::EncodingArgs;
use crate::commands::{read_input, resolve_encoding};

pub fn handle(file: Option<PathBuf>, encoding_args: EncodingArgs, config: &Config) -> Result<()> {
    let encoding = resolve_encoding(&encoding_args, config)?;
    let text = read_input(file.as_deref())?;
    let count = count_tokens(&text, &encoding)?;

    match model_limit(&encoding, config) {
        Some(limit) => println!("{count} / {limit} tokens"),
        None => println!("{count} tokens"),
    }

    Ok(())
}

/// Token limit to show next to the count, for models in the table
fn model_limit(encoding: &EncodingRef, config: &Config) -> Option<usize> {
    encoding
        .is_model()
        .then(|| config.model_limits().get(encoding.name()))
        .flatten()
}
