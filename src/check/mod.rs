//! Correctness checking of normalized text.
//!
//! # Architecture
//!
//! - [`CheckProvider`]: async trait for one checking service
//! - [`ProviderChain`]: ordered fallback over providers, per chunk
//! - [`CheckCoordinator`]: dispatches chunks and translates findings into
//!   normalized-text offsets
//!
//! Providers report [`Finding`]s in chunk-local character offsets. The
//! coordinator turns them into document-wide [`ErrorSpan`]s.

pub mod coordinator;
pub mod http;
pub mod providers;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub use coordinator::{CheckConfig, CheckCoordinator, CheckOutcome, CheckStatus, ChunkReport};

/// Errors from a single provider call. Any of them advances the chain.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned status {status}")]
    Status { provider: &'static str, status: u16 },

    #[error("could not parse {provider} response: {reason}")]
    Parse {
        provider: &'static str,
        reason: String,
    },

    #[error("{0} is unavailable")]
    Unavailable(String),
}

/// A problem reported by a provider, in chunk-local character offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub start: usize,
    pub end: usize,
    pub wrong: String,
    pub correct: String,
    pub help: Option<String>,
    pub category: Option<String>,
}

/// A problem in normalized-text coordinates. `[start, end)` is half-open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSpan {
    pub start: usize,
    pub end: usize,
    pub wrong: String,
    pub correct: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Provider that reported it.
    #[serde(default)]
    pub provider: String,
}

impl ErrorSpan {
    #[must_use]
    pub fn new(start: usize, end: usize, wrong: &str, correct: &str) -> Self {
        Self {
            start,
            end,
            wrong: wrong.to_string(),
            correct: correct.to_string(),
            help: None,
            category: None,
            provider: String::new(),
        }
    }

    /// Annotation text shown next to the highlight.
    #[must_use]
    pub fn message(&self) -> String {
        format!("{} → {}", self.wrong, self.correct)
    }
}

/// One checking service.
#[async_trait]
pub trait CheckProvider: Send + Sync {
    /// Short lowercase provider name (e.g., `"bareun"`, `"rules"`).
    fn name(&self) -> &'static str;

    /// Check one chunk of text.
    ///
    /// `Ok` with an empty list means "checked, nothing found" and stops the
    /// chain; `Err` hands the chunk to the next provider.
    async fn check(&self, text: &str) -> Result<Vec<Finding>, CheckError>;
}

/// A provider that failed on a chunk.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderFailure {
    pub provider: &'static str,
    pub error: String,
}

/// Result of running a chunk through the chain.
#[derive(Debug)]
pub enum ChainResult {
    Checked {
        provider: &'static str,
        findings: Vec<Finding>,
        failures: Vec<ProviderFailure>,
    },
    Exhausted {
        failures: Vec<ProviderFailure>,
    },
}

/// Providers tried in order for each chunk. First success wins; results
/// from different providers are never mixed within a chunk.
pub struct ProviderChain {
    providers: Vec<Box<dyn CheckProvider>>,
}

impl ProviderChain {
    #[must_use]
    pub fn new(providers: Vec<Box<dyn CheckProvider>>) -> Self {
        Self { providers }
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub async fn check(&self, text: &str) -> ChainResult {
        let mut failures = Vec::new();
        for provider in &self.providers {
            match provider.check(text).await {
                Ok(findings) => {
                    debug!("{} reported {} findings", provider.name(), findings.len());
                    return ChainResult::Checked {
                        provider: provider.name(),
                        findings,
                        failures,
                    };
                }
                Err(e) => {
                    warn!("Provider {} failed, trying next: {}", provider.name(), e);
                    failures.push(ProviderFailure {
                        provider: provider.name(),
                        error: e.to_string(),
                    });
                }
            }
        }
        ChainResult::Exhausted { failures }
    }
}

/// Assigns character offsets to findings that only carry the wrong text.
///
/// Some services return `(wrong, correct)` pairs without positions. The
/// locator searches for each `wrong` string from the end of the previous
/// match, falling back to the start of the text, so repeated words are
/// matched in reading order.
pub struct Locator {
    chars: Vec<char>,
    cursor: usize,
}

impl Locator {
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            cursor: 0,
        }
    }

    /// Character range of `needle`, preferring `hint` when the text there
    /// matches exactly.
    pub fn locate(&mut self, needle: &str, hint: Option<usize>) -> Option<(usize, usize)> {
        let needle: Vec<char> = needle.chars().collect();
        if needle.is_empty() {
            return None;
        }
        let found = hint
            .filter(|&h| self.matches_at(&needle, h))
            .or_else(|| self.find_from(&needle, self.cursor))
            .or_else(|| self.find_from(&needle, 0))?;
        self.cursor = found + needle.len();
        Some((found, found + needle.len()))
    }

    fn matches_at(&self, needle: &[char], at: usize) -> bool {
        self.chars
            .get(at..at + needle.len())
            .is_some_and(|window| window == needle)
    }

    fn find_from(&self, needle: &[char], from: usize) -> Option<usize> {
        if needle.len() > self.chars.len() {
            return None;
        }
        (from..=self.chars.len() - needle.len()).find(|&i| self.matches_at(needle, i))
    }
}

/// Convert a byte offset into `text` to a character offset.
///
/// `None` when the offset is past the end or inside a character.
#[must_use]
pub fn char_offset(text: &str, byte_offset: usize) -> Option<usize> {
    text.get(..byte_offset).map(|prefix| prefix.chars().count())
}
