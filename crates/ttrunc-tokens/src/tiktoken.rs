use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tiktoken_rs::CoreBPE;
use tracing::debug;
use ttrunc_core::{EncodingRef, Result, Tokenizer, TruncateError};

/// Loaded vocabularies, keyed by encoding name. Building a `CoreBPE` parses
/// the whole rank table, so each one is loaded once per process.
static ENCODINGS: OnceLock<Mutex<HashMap<String, Arc<CoreBPE>>>> = OnceLock::new();

/// Model name prefixes and the encoding each family uses. More specific
/// prefixes come first.
const MODEL_PREFIXES: &[(&str, &str)] = &[
    ("gpt-4o", "o200k_base"),
    ("gpt-4.", "o200k_base"),
    ("gpt-5", "o200k_base"),
    ("o1", "o200k_base"),
    ("o3", "o200k_base"),
    ("o4", "o200k_base"),
    ("gpt-4", "cl100k_base"),
    ("gpt-3.5", "cl100k_base"),
    ("text-embedding-3", "cl100k_base"),
    ("text-embedding-ada-002", "cl100k_base"),
    ("text-davinci-002", "p50k_base"),
    ("text-davinci-003", "p50k_base"),
    ("code-davinci", "p50k_base"),
    ("text-davinci-edit", "p50k_edit"),
    ("code-davinci-edit", "p50k_edit"),
];

/// Encoding name used by `model`, if the model family is known
pub fn encoding_for_model(model: &str) -> Option<&'static str> {
    MODEL_PREFIXES
        .iter()
        .find(|(prefix, _)| model.starts_with(prefix))
        .map(|&(_, encoding)| encoding)
}

fn load_encoding(name: &str) -> Result<CoreBPE> {
    let bpe = match name {
        "o200k_base" => tiktoken_rs::o200k_base(),
        "cl100k_base" => tiktoken_rs::cl100k_base(),
        "p50k_base" => tiktoken_rs::p50k_base(),
        "p50k_edit" => tiktoken_rs::p50k_edit(),
        "r50k_base" | "gpt2" => tiktoken_rs::r50k_base(),
        other => return Err(TruncateError::UnknownEncoding(other.to_string())),
    };
    Ok(bpe?)
}

fn cached(key: &str, load: impl FnOnce() -> Result<CoreBPE>) -> Result<Arc<CoreBPE>> {
    let cache = ENCODINGS.get_or_init(Default::default);
    let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);

    if let Some(bpe) = cache.get(key) {
        return Ok(Arc::clone(bpe));
    }

    debug!(encoding = key, "Loading tiktoken vocabulary");
    let bpe = Arc::new(load()?);
    cache.insert(key.to_string(), Arc::clone(&bpe));
    Ok(bpe)
}

/// `Tokenizer` backed by a tiktoken vocabulary
#[derive(Clone)]
pub struct TiktokenTokenizer {
    name: String,
    bpe: Arc<CoreBPE>,
}

impl TiktokenTokenizer {
    /// cl100k_base (GPT-4, GPT-3.5-turbo, text-embedding-3)
    pub fn new() -> Result<Self> {
        Self::for_encoding("cl100k_base")
    }

    pub fn for_encoding(name: &str) -> Result<Self> {
        let name = name.to_ascii_lowercase();
        let bpe = cached(&name, || load_encoding(&name))?;
        Ok(Self { name, bpe })
    }

    /// Vocabulary of `model`. Unknown families are looked up in
    /// tiktoken-rs' own model table before giving up.
    pub fn for_model(model: &str) -> Result<Self> {
        if let Some(encoding) = encoding_for_model(model) {
            return Self::for_encoding(encoding);
        }

        let key = format!("model:{model}");
        let bpe = cached(&key, || {
            tiktoken_rs::get_bpe_from_model(model).map_err(|err| {
                TruncateError::UnknownEncoding(format!("{model} ({err})"))
            })
        })?;
        Ok(Self { name: key, bpe })
    }

    pub fn for_ref(encoding: &EncodingRef) -> Result<Self> {
        match encoding {
            EncodingRef::Model(model) => Self::for_model(model),
            EncodingRef::Encoding(name) => Self::for_encoding(name),
        }
    }

    /// Estimate token count for a single string
    pub fn estimate(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    /// Estimate tokens for multiple strings (batch processing)
    pub fn estimate_batch(&self, texts: &[&str]) -> Vec<usize> {
        texts.iter().map(|text| self.estimate(text)).collect()
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self, text: &str) -> Vec<u32> {
        self.bpe.encode_ordinary(text)
    }

    fn decode(&self, tokens: &[u32]) -> Result<String> {
        self.bpe
            .decode(tokens.to_vec())
            .map_err(|err| TruncateError::Decode(err.to_string()))
    }

    fn count(&self, text: &str) -> usize {
        self.estimate(text)
    }
}
