//! Encoding references
//!
//! Callers select a vocabulary either directly (`cl100k_base`) or through
//! the model that uses it (`gpt-4o`). Resolution to an actual vocabulary
//! is the tokenizer adapter's job.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Result, TruncateError};

/// Vocabulary names recognised as encodings rather than models
pub const KNOWN_ENCODINGS: &[&str] = &[
    "o200k_base",
    "cl100k_base",
    "p50k_base",
    "p50k_edit",
    "r50k_base",
    "gpt2",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingRef {
    /// A model name, resolved to that model's encoding
    Model(String),
    /// A vocabulary name such as `cl100k_base`
    Encoding(String),
}

impl EncodingRef {
    pub fn model(name: impl Into<String>) -> Self {
        Self::Model(name.into())
    }

    pub fn encoding(name: impl Into<String>) -> Self {
        Self::Encoding(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Model(name) | Self::Encoding(name) => name,
        }
    }

    pub fn is_model(&self) -> bool {
        matches!(self, Self::Model(_))
    }
}

impl FromStr for EncodingRef {
    type Err = TruncateError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        if name.is_empty() {
            return Err(TruncateError::UnknownEncoding(
                "empty encoding reference".to_string(),
            ));
        }

        let lowered = name.to_ascii_lowercase();
        if KNOWN_ENCODINGS.contains(&lowered.as_str()) {
            Ok(Self::Encoding(lowered))
        } else {
            Ok(Self::Model(name.to_string()))
        }
    }
}

impl fmt::Display for EncodingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model(name) => write!(f, "model:{name}"),
            Self::Encoding(name) => write!(f, "encoding:{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_encoding_names() {
        assert_eq!(
            "cl100k_base".parse::<EncodingRef>().unwrap(),
            EncodingRef::encoding("cl100k_base")
        );
        assert_eq!(
            " O200K_BASE ".parse::<EncodingRef>().unwrap(),
            EncodingRef::encoding("o200k_base")
        );
    }

    #[test]
    fn test_parse_model_names() {
        let parsed: EncodingRef = "text-embedding-3-large".parse().unwrap();
        assert!(parsed.is_model());
        assert_eq!(parsed.name(), "text-embedding-3-large");
    }

    #[test]
    fn test_parse_empty_fails() {
        assert!(matches!(
            "  ".parse::<EncodingRef>(),
            Err(TruncateError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&EncodingRef::model("gpt-4o")).unwrap();
        assert_eq!(json, r#"{"model":"gpt-4o"}"#);
    }
}
