use std::fmt;

use crate::{Result, TruncateError};

/// Maximum number of tokens a truncated string may encode to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenBudget(usize);

impl TokenBudget {
    /// Validate a caller-supplied budget. Negative values are rejected.
    pub fn new(max_tokens: i64) -> Result<Self> {
        usize::try_from(max_tokens).map(Self).map_err(|_| {
            TruncateError::InvalidArgument(format!(
                "max_tokens must be non-negative, got {max_tokens}"
            ))
        })
    }

    pub fn get(self) -> usize {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<usize> for TokenBudget {
    fn from(max_tokens: usize) -> Self {
        Self(max_tokens)
    }
}

impl TryFrom<i64> for TokenBudget {
    type Error = TruncateError;

    fn try_from(max_tokens: i64) -> Result<Self> {
        Self::new(max_tokens)
    }
}

impl fmt::Display for TokenBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
