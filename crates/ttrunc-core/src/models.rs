use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Result, TokenBudget, TruncateError};

/// Maximum input tokens per model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelLimit {
    pub model: String,
    pub max_tokens: usize,
}

/// Lookup table from model name to its maximum input length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelLimits {
    limits: BTreeMap<String, usize>,
}

impl ModelLimits {
    pub fn empty() -> Self {
        Self {
            limits: BTreeMap::new(),
        }
    }

    /// Table of models with published input limits
    pub fn builtin() -> Self {
        let limits = [
            ("text-embedding-3-large", 8192),
            ("text-embedding-3-small", 8192),
            ("text-embedding-ada-002", 8191),
            ("gpt-3.5-turbo", 16_385),
            ("gpt-4", 8192),
            ("gpt-4-32k", 32_768),
            ("gpt-4-turbo", 128_000),
            ("gpt-4o", 128_000),
            ("gpt-4o-mini", 128_000),
        ]
        .into_iter()
        .map(|(model, max)| (model.to_string(), max))
        .collect();

        Self { limits }
    }

    pub fn get(&self, model: &str) -> Option<usize> {
        self.limits.get(model).copied()
    }

    /// Budget for `model`, or `UnknownModel` if the table has no entry
    pub fn budget_for(&self, model: &str) -> Result<TokenBudget> {
        self.get(model)
            .map(TokenBudget::from)
            .ok_or_else(|| TruncateError::UnknownModel(model.to_string()))
    }

    /// Insert or replace a limit, returning the previous one
    pub fn insert(&mut self, model: impl Into<String>, max_tokens: usize) -> Option<usize> {
        self.limits.insert(model.into(), max_tokens)
    }

    pub fn iter(&self) -> impl Iterator<Item = ModelLimit> + '_ {
        self.limits.iter().map(|(model, &max_tokens)| ModelLimit {
            model: model.clone(),
            max_tokens,
        })
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }
}

impl Default for ModelLimits {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Extend<(String, usize)> for ModelLimits {
    fn extend<T: IntoIterator<Item = (String, usize)>>(&mut self, iter: T) {
        self.limits.extend(iter);
    }
}
