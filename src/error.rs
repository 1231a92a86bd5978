//! Library error types.

use thiserror::Error;

/// Errors that abort processing of a whole document.
///
/// Per-span and per-chunk problems are not errors: they surface as
/// [`DiscardedSpan`](crate::reconcile::DiscardedSpan)s and chunk failures in
/// the [`ProofReport`](crate::pipeline::ProofReport).
#[derive(Error, Debug)]
pub enum ProofError {
    #[error(
        "malformed input: original index {found} at position {position} does not follow {previous}"
    )]
    MalformedInput {
        position: usize,
        previous: usize,
        found: usize,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ProofError>;
