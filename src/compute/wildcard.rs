//! `%` wildcard matching for names, providers and types.
//!
//! Supported shapes are an exact literal, a prefix (`abc%`), a suffix
//! (`%abc`) and a bare `%` matching everything. Matching is case-insensitive;
//! patterns are folded once when parsed.

use crate::error::{Result, StoreError};

pub const WILDCARD: char = '%';

/// A single parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Any,
    Exact(String),
    Prefix(String),
    Suffix(String),
}

impl Pattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        let folded = pattern.to_lowercase();
        let count = folded.matches(WILDCARD).count();

        match count {
            0 => Ok(Pattern::Exact(folded)),
            1 if folded.len() == 1 => Ok(Pattern::Any),
            1 if folded.ends_with(WILDCARD) => {
                Ok(Pattern::Prefix(folded[..folded.len() - 1].to_string()))
            }
            1 if folded.starts_with(WILDCARD) => Ok(Pattern::Suffix(folded[1..].to_string())),
            _ => Err(StoreError::UnsupportedFilter(format!(
                "wildcard pattern '{}' must be a literal, 'text%' or '%text'",
                pattern
            ))),
        }
    }

    /// Match an already case-folded value.
    pub fn matches_folded(&self, value: &str) -> bool {
        match self {
            Pattern::Any => true,
            Pattern::Exact(text) => value == text,
            Pattern::Prefix(text) => value.starts_with(text.as_str()),
            Pattern::Suffix(text) => value.ends_with(text.as_str()),
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        self.matches_folded(&value.to_lowercase())
    }
}

/// Matches a value against any of several patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardMatcher {
    patterns: Vec<Pattern>,
}

impl WildcardMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// True if some pattern needs a scan rather than an exact or prefix lookup.
    pub fn needs_scan(&self) -> bool {
        self.patterns
            .iter()
            .any(|p| matches!(p, Pattern::Any | Pattern::Suffix(_)))
    }

    pub fn matches(&self, value: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        self.matches_folded(&value.to_lowercase())
    }

    /// Match an already case-folded value.
    pub fn matches_folded(&self, value: &str) -> bool {
        self.patterns.iter().any(|p| p.matches_folded(value))
    }
}
