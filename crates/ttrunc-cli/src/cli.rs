use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use ttrunc_core::Strategy;

#[derive(Parser)]
#[command(name = "ttrunc")]
#[command(about = "Truncate text to a maximum token length using tiktoken", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true, env = "TTRUNC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Truncate text to a token budget and write it to stdout
    Truncate {
        /// Input file (reads stdin when omitted)
        file: Option<PathBuf>,

        #[command(flatten)]
        encoding: EncodingArgs,

        /// Token budget (default: the model's limit)
        #[arg(long, allow_negative_numbers = true)]
        max_tokens: Option<i64>,

        /// Search strategy (default from config: bisect)
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
    },

    /// Count tokens in text
    Count {
        /// Input file (reads stdin when omitted)
        file: Option<PathBuf>,

        #[command(flatten)]
        encoding: EncodingArgs,
    },

    /// List known model token limits
    Models {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct EncodingArgs {
    /// Model whose vocabulary to use (e.g. gpt-4o, text-embedding-3-large)
    #[arg(long, short)]
    pub model: Option<String>,

    /// Vocabulary name (e.g. cl100k_base, o200k_base)
    #[arg(long, short, conflicts_with = "model")]
    pub encoding: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    Decode,
    Bisect,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Decode => Strategy::Decode,
            StrategyArg::Bisect => Strategy::Bisect,
        }
    }
}
