//! Annotation geometry for resolved error spans.
//!
//! Produces the page regions a renderer draws: one [`AnnotationRegion`] per
//! span and page, each holding one rectangle per line the span touches.
//!
//! # Example
//!
//! ```rust
//! use proofmark::annotate::AnnotationGrouper;
//! use proofmark::check::ErrorSpan;
//! use proofmark::document::from_plain_text;
//! use proofmark::normalize::Normalizer;
//! use proofmark::reconcile::Reconciler;
//!
//! let chars = from_plain_text("되요 오늘 날씨 좋다");
//! let normalized = Normalizer::default().normalize(&chars)?;
//! let span = ErrorSpan::new(0, 2, "되요", "돼요");
//! if let Ok(original) = Reconciler::new(&normalized, &chars).reconcile(&span) {
//!     let regions = AnnotationGrouper::new(normalized.anchors(), &chars).group(&original);
//!     assert_eq!(regions[0].message, "되요 → 돼요");
//! }
//! # Ok::<(), proofmark::ProofError>(())
//! ```

pub mod region;

pub use region::{AnnotationGrouper, AnnotationRegion};
