//! End-to-end processing of one document.

use serde::Serialize;
use tracing::{info, warn};

use crate::annotate::{AnnotationGrouper, AnnotationRegion};
use crate::check::http::build_client;
use crate::check::providers;
use crate::check::{CheckCoordinator, CheckStatus, ChunkReport, ProviderChain};
use crate::chunk::Chunker;
use crate::config::Config;
use crate::document::PositionedCharacter;
use crate::error::Result;
use crate::normalize::Normalizer;
use crate::reconcile::{DiscardedSpan, Reconciler};

/// Counters for one document pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportStats {
    pub characters: usize,
    pub normalized: usize,
    pub dropped: usize,
    pub chunks: usize,
    pub spans: usize,
    pub regions: usize,
    pub discarded: usize,
}

/// Everything learned about one document.
#[derive(Debug, Clone, Serialize)]
pub struct ProofReport {
    pub normalized_text: String,
    pub regions: Vec<AnnotationRegion>,
    pub discarded: Vec<DiscardedSpan>,
    #[serde(flatten)]
    pub status: CheckStatus,
    pub chunks: Vec<ChunkReport>,
    pub stats: ReportStats,
}

/// Normalize, chunk, check, reconcile and group, in that order.
pub struct Proofreader {
    normalizer: Normalizer,
    chunker: Chunker,
    coordinator: CheckCoordinator,
}

impl Proofreader {
    /// Build with an explicit provider chain.
    ///
    /// # Errors
    ///
    /// Returns [`ProofError::Config`](crate::error::ProofError::Config) for
    /// invalid chunk settings.
    pub fn new(config: &Config, chain: ProviderChain) -> Result<Self> {
        Ok(Self {
            normalizer: Normalizer::new(config.normalize.clone()),
            chunker: Chunker::new(config.chunk.clone())?,
            coordinator: CheckCoordinator::new(chain, &config.check),
        })
    }

    /// Build the provider chain named in `config.check.providers`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the chunk
    /// settings are invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_client()?;
        let built = providers::build(&config.check.providers, &config.providers, &client);
        if built.is_empty() {
            warn!("No usable providers configured; every chunk will fail");
        }
        Self::new(config, ProviderChain::new(built))
    }

    #[must_use]
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.coordinator.provider_names()
    }

    /// Run one document through the whole pipeline.
    ///
    /// Chunk failures and unplaceable spans do not abort the document; they
    /// show up in the report's status and discarded list.
    ///
    /// # Errors
    ///
    /// Returns [`ProofError::MalformedInput`](crate::error::ProofError::MalformedInput)
    /// if the character stream is not in strictly increasing `original_index`
    /// order.
    pub async fn process(&self, chars: &[PositionedCharacter]) -> Result<ProofReport> {
        let normalized = self.normalizer.normalize(chars)?;
        let chunks = self.chunker.split(normalized.chars());
        let outcome = self.coordinator.check_all(&chunks).await;

        let (placed, discarded) =
            Reconciler::new(&normalized, chars).reconcile_all(&outcome.spans);
        let regions = AnnotationGrouper::new(normalized.anchors(), chars).group_all(&placed);

        let stats = ReportStats {
            characters: chars.len(),
            normalized: normalized.len(),
            dropped: normalized.anchors().dropped_indices().len(),
            chunks: chunks.len(),
            spans: outcome.spans.len(),
            regions: regions.len(),
            discarded: discarded.len(),
        };
        info!(
            "Document done: {} spans, {} regions, {} discarded ({:?})",
            stats.spans, stats.regions, stats.discarded, outcome.status
        );

        Ok(ProofReport {
            normalized_text: normalized.text().to_string(),
            regions,
            discarded,
            status: outcome.status,
            chunks: outcome.chunks,
            stats,
        })
    }
}
