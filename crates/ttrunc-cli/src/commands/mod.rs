pub mod count;
pub mod models;
pub mod truncate;

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use ttrunc_config::Config;
use ttrunc_core::EncodingRef;

use crate::cli::EncodingArgs;

/// Read the whole input from `file`, or stdin when no file is given
pub fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Pick the vocabulary: `--model`, then `--encoding`, then the config default
pub fn resolve_encoding(args: &EncodingArgs, config: &Config) -> Result<EncodingRef> {
    if let Some(model) = &args.model {
        return Ok(EncodingRef::model(model.as_str()));
    }
    if let Some(encoding) = &args.encoding {
        return Ok(encoding.parse()?);
    }
    config.default_encoding()
}
