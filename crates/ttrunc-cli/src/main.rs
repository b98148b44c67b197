mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use ttrunc_config::Config;

fn main() -> Result<()> {
    // Initialize tracing (stderr, stdout carries the truncated text)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = cli::Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_default(),
    };

    match cli.command {
        cli::Commands::Truncate {
            file,
            encoding,
            max_tokens,
            strategy,
        } => commands::truncate::handle(file, encoding, max_tokens, strategy, &config),
        cli::Commands::Count { file, encoding } => commands::count::handle(file, encoding, &config),
        cli::Commands::Models { json } => commands::models::handle(json, &config),
    }
}
