//! `proofmark` - Position-preserving proofreading for laid-out documents
//!
//! # Features
//!
//! - **Normalization**: joins words split by hyphenation and line wraps,
//!   repairs stray spaces before Korean postpositions, keeps an exact map
//!   back to every source character
//! - **Chunked checking**: bounded chunks sent through an ordered chain of
//!   checking services (Bareun, Naver, Pusan, offline rules)
//! - **Reconciliation**: error spans mapped back onto original characters,
//!   across merges and chunk boundaries
//! - **Annotation geometry**: per-page rectangles ready for a renderer
//!
//! # Example
//!
//! ```rust,no_run
//! use proofmark::{document::from_plain_text, Config, Proofreader};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let reader = Proofreader::from_config(&Config::load(None)?)?;
//!     let report = reader.process(&from_plain_text("되요 오늘 날씨 좋다")).await?;
//!     for region in &report.regions {
//!         println!("page {}: {}", region.page_index, region.message);
//!     }
//!     Ok(())
//! }
//! ```

pub mod annotate;
pub mod check;
pub mod chunk;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;

pub use annotate::{AnnotationGrouper, AnnotationRegion};
pub use check::{CheckProvider, CheckStatus, ErrorSpan, ProviderChain};
pub use chunk::{Chunk, Chunker};
pub use config::Config;
pub use document::{BoundingBox, PositionedCharacter};
pub use error::ProofError;
pub use normalize::{AnchorMap, Normalized, Normalizer};
pub use pipeline::{ProofReport, Proofreader};
pub use reconcile::{DiscardedSpan, OriginalSpan, Reconciler};

/// Version of proofmark
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
