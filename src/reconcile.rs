//! Mapping error spans back onto original characters.
//!
//! A span `[start, end)` in normalized text resolves to the ordered union of
//! the original indices anchored at those offsets. When a span edge touches
//! a merge point the span grows to the whole token, and characters dropped
//! inside the span (the hyphen of a merged word, for instance) are included
//! so the highlight covers what the reader sees on the page.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::check::ErrorSpan;
use crate::document::{lookup, PositionedCharacter};
use crate::normalize::{is_token_boundary, Normalized};

/// Why a span could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    /// `start >= end`.
    EmptyRange,
    /// `end` past the end of the normalized text.
    OutOfBounds,
    /// `wrong` does not match the text at `[start, end)`.
    Stale,
    /// None of the anchored originals exist in the character stream.
    Unresolved,
}

/// A span that was dropped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscardedSpan {
    pub span: ErrorSpan,
    pub reason: DiscardReason,
}

/// An error span resolved to positioned characters.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginalSpan<'a> {
    pub span: ErrorSpan,
    /// Normalized range after extension over merge points.
    pub start: usize,
    pub end: usize,
    /// Characters in reading order, no duplicates.
    pub characters: Vec<&'a PositionedCharacter>,
}

impl OriginalSpan<'_> {
    #[must_use]
    pub fn original_indices(&self) -> Vec<usize> {
        self.characters.iter().map(|c| c.original_index).collect()
    }
}

pub struct Reconciler<'a> {
    normalized: &'a Normalized,
    chars: &'a [PositionedCharacter],
}

impl<'a> Reconciler<'a> {
    /// `chars` must be the stream `normalized` was built from.
    #[must_use]
    pub fn new(normalized: &'a Normalized, chars: &'a [PositionedCharacter]) -> Self {
        Self { normalized, chars }
    }

    /// Resolve one span.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscardedSpan`] when the span is empty, out of bounds,
    /// stale, or maps to no known character.
    pub fn reconcile(&self, span: &ErrorSpan) -> Result<OriginalSpan<'a>, DiscardedSpan> {
        let discard = |reason: DiscardReason| {
            debug!(
                "Discarding span {}..{} '{}': {:?}",
                span.start, span.end, span.wrong, reason
            );
            Err(DiscardedSpan {
                span: span.clone(),
                reason,
            })
        };

        if span.start >= span.end {
            return discard(DiscardReason::EmptyRange);
        }
        if span.end > self.normalized.len() {
            return discard(DiscardReason::OutOfBounds);
        }
        if !span.wrong.is_empty() && self.normalized.slice(span.start, span.end) != span.wrong {
            return discard(DiscardReason::Stale);
        }

        let (start, end) = self.extend(span.start, span.end);
        let anchors = self.normalized.anchors();

        // Anchors are monotonic and gap originals sit between their
        // neighbors, so index order is reading order.
        let mut originals: BTreeSet<usize> = (start..end)
            .flat_map(|offset| anchors.originals(offset).iter().copied())
            .collect();
        for (_, gap) in anchors.gaps_within(start, end) {
            originals.extend(gap.originals.iter().copied());
        }

        let characters: Vec<&'a PositionedCharacter> = originals
            .iter()
            .filter_map(|&idx| lookup(self.chars, idx))
            .collect();
        if characters.is_empty() {
            return discard(DiscardReason::Unresolved);
        }
        if characters.len() < originals.len() {
            debug!(
                "Span {}..{}: {} of {} originals missing from stream",
                span.start,
                span.end,
                originals.len() - characters.len(),
                originals.len()
            );
        }

        Ok(OriginalSpan {
            span: span.clone(),
            start,
            end,
            characters,
        })
    }

    /// Resolve every span, splitting placed from discarded.
    #[must_use]
    pub fn reconcile_all(&self, spans: &[ErrorSpan]) -> (Vec<OriginalSpan<'a>>, Vec<DiscardedSpan>) {
        let mut placed = Vec::with_capacity(spans.len());
        let mut discarded = Vec::new();
        for span in spans {
            match self.reconcile(span) {
                Ok(original) => placed.push(original),
                Err(d) => discarded.push(d),
            }
        }
        (placed, discarded)
    }

    /// Grow `[start, end)` to token edges where an edge sits on a merge point.
    fn extend(&self, mut start: usize, mut end: usize) -> (usize, usize) {
        let anchors = self.normalized.anchors();
        if anchors.is_merge_point(start) {
            while start > 0 && !is_token_boundary(self.normalized, start - 1) {
                start -= 1;
            }
        }
        if anchors.is_merge_point(end) {
            while end < self.normalized.len() && !is_token_boundary(self.normalized, end) {
                end += 1;
            }
        }
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{from_plain_text, BoundingBox};
    use crate::normalize::Normalizer;

    fn setup(text: &str) -> (Vec<PositionedCharacter>, Normalized) {
        let chars = from_plain_text(text);
        let normalized = Normalizer::default().normalize(&chars).unwrap();
        (chars, normalized)
    }

    #[test]
    fn plain_span_maps_one_to_one() {
        let (chars, normalized) = setup("되요 오늘 날씨 좋다");
        let reconciler = Reconciler::new(&normalized, &chars);
        let original = reconciler
            .reconcile(&ErrorSpan::new(0, 2, "되요", "돼요"))
            .unwrap();
        assert_eq!(original.original_indices(), vec![0, 1]);
        assert_eq!((original.start, original.end), (0, 2));
    }

    #[test]
    fn span_touching_merge_point_covers_whole_token() {
        let (chars, normalized) = setup("안녕하세-\n요 친구");
        assert_eq!(normalized.text(), "안녕하세요 친구");
        let reconciler = Reconciler::new(&normalized, &chars);

        // "요" alone starts on the merge point: grows back to the token start.
        let original = reconciler.reconcile(&ErrorSpan::new(4, 5, "요", "")).unwrap();
        assert_eq!((original.start, original.end), (0, 5));
        assert_eq!(original.original_indices(), vec![0, 1, 2, 3, 4, 5, 6]);

        // "안녕하세" ends on it: grows forward.
        let original = reconciler
            .reconcile(&ErrorSpan::new(0, 4, "안녕하세", ""))
            .unwrap();
        assert_eq!((original.start, original.end), (0, 5));
    }

    #[test]
    fn interior_gap_originals_are_included() {
        let (chars, normalized) = setup("안녕하세-\n요");
        let reconciler = Reconciler::new(&normalized, &chars);
        let original = reconciler
            .reconcile(&ErrorSpan::new(3, 5, "세요", "셔요"))
            .unwrap();
        assert_eq!(original.original_indices(), vec![3, 4, 5, 6]);
    }

    #[test]
    fn invalid_spans_are_discarded_with_reason() {
        let (chars, normalized) = setup("되요 좋다");
        let reconciler = Reconciler::new(&normalized, &chars);
        let reason = |span: ErrorSpan| reconciler.reconcile(&span).unwrap_err().reason;

        assert_eq!(reason(ErrorSpan::new(2, 2, "", "")), DiscardReason::EmptyRange);
        assert_eq!(reason(ErrorSpan::new(3, 9, "", "")), DiscardReason::OutOfBounds);
        assert_eq!(reason(ErrorSpan::new(0, 2, "좋다", "")), DiscardReason::Stale);
    }

    #[test]
    fn missing_characters_are_unresolved() {
        let (_, normalized) = setup("되요");
        let reconciler = Reconciler::new(&normalized, &[]);
        let err = reconciler
            .reconcile(&ErrorSpan::new(0, 2, "되요", "돼요"))
            .unwrap_err();
        assert_eq!(err.reason, DiscardReason::Unresolved);
    }

    #[test]
    fn partially_missing_characters_still_resolve() {
        let (chars, normalized) = setup("되요");
        let partial = vec![chars[1].clone()];
        let reconciler = Reconciler::new(&normalized, &partial);
        let original = reconciler
            .reconcile(&ErrorSpan::new(0, 2, "되요", "돼요"))
            .unwrap();
        assert_eq!(original.original_indices(), vec![1]);
    }

    #[test]
    fn reconciliation_is_deterministic() {
        let (chars, normalized) = setup("그 사람 이\n학교에 갔 다-\n가 왔다");
        let reconciler = Reconciler::new(&normalized, &chars);
        let spans: Vec<ErrorSpan> = (0..normalized.len())
            .flat_map(|s| (s + 1..=normalized.len()).map(move |e| ErrorSpan::new(s, e, "", "")))
            .collect();
        let first: Vec<Vec<usize>> = reconciler
            .reconcile_all(&spans)
            .0
            .iter()
            .map(OriginalSpan::original_indices)
            .collect();
        let second: Vec<Vec<usize>> = reconciler
            .reconcile_all(&spans)
            .0
            .iter()
            .map(OriginalSpan::original_indices)
            .collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|indices| indices.windows(2).all(|w| w[0] < w[1])));
    }

    #[test]
    fn carriage_return_inside_span_is_highlighted() {
        let chars = vec![
            PositionedCharacter::new(0, 0, '끝', BoundingBox::new(0.0, 0.0, 10.0, 12.0)),
            PositionedCharacter::new(0, 1, '.', BoundingBox::new(10.0, 0.0, 4.0, 12.0)),
            PositionedCharacter::new(0, 2, '\r', BoundingBox::default()),
            PositionedCharacter::new(0, 3, '\n', BoundingBox::default()),
            PositionedCharacter::new(0, 4, '새', BoundingBox::new(0.0, -18.0, 10.0, 12.0)),
        ];
        let normalized = Normalizer::default().normalize(&chars).unwrap();
        assert_eq!(normalized.text(), "끝. 새");
        let reconciler = Reconciler::new(&normalized, &chars);
        assert_eq!(normalized.anchors().originals(2), &[3]);
        let original = reconciler.reconcile(&ErrorSpan::new(1, 3, ". ", "")).unwrap();
        assert_eq!(original.original_indices(), vec![1, 2, 3]);

        // The space alone does not reach back over the dropped `\r`.
        let original = reconciler.reconcile(&ErrorSpan::new(2, 3, " ", "")).unwrap();
        assert_eq!(original.original_indices(), vec![3]);
    }
}
