//! Normalized offset ↔ original index mapping.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use serde::Serialize;

use crate::document::PositionedCharacter;

/// Why characters were dropped at a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    /// Layout artifact between two halves of one token (hyphen, wrap,
    /// split postposition). Annotations touching it extend across.
    Merge,
    /// Control characters and collapsed whitespace.
    Noise,
}

/// Sentinel for dropped characters sitting at a normalized boundary.
///
/// Boundary `b` lies between normalized offsets `b - 1` and `b`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gap {
    pub kind: GapKind,
    pub originals: Vec<usize>,
}

/// Map from normalized-text offsets to the original characters they came
/// from, plus gap sentinels for every dropped character.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnchorMap {
    offsets: Vec<Vec<usize>>,
    gaps: BTreeMap<usize, Gap>,
    dropped: BTreeSet<usize>,
}

impl AnchorMap {
    /// Number of normalized offsets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Original indices behind a normalized offset. Empty when out of range.
    #[must_use]
    pub fn originals(&self, offset: usize) -> &[usize] {
        self.offsets.get(offset).map_or(&[], Vec::as_slice)
    }

    /// Gap sentinel at boundary `b`, if anything was dropped there.
    #[must_use]
    pub fn gap_at(&self, boundary: usize) -> Option<&Gap> {
        self.gaps.get(&boundary)
    }

    /// Whether boundary `b` joins two halves of one token.
    #[must_use]
    pub fn is_merge_point(&self, boundary: usize) -> bool {
        self.gap_at(boundary)
            .is_some_and(|gap| gap.kind == GapKind::Merge)
    }

    /// Gaps at boundaries strictly inside `(start, end)`.
    pub fn gaps_within(&self, start: usize, end: usize) -> impl Iterator<Item = (usize, &Gap)> {
        let range = if start < end {
            (Bound::Excluded(start), Bound::Excluded(end))
        } else {
            (Bound::Excluded(start), Bound::Included(start))
        };
        self.gaps.range(range).map(|(b, gap)| (*b, gap))
    }

    /// All gap sentinels in boundary order.
    pub fn gaps(&self) -> impl Iterator<Item = (usize, &Gap)> {
        self.gaps.iter().map(|(b, gap)| (*b, gap))
    }

    /// Original indices consumed during normalization.
    #[must_use]
    pub fn dropped_indices(&self) -> &BTreeSet<usize> {
        &self.dropped
    }

    #[must_use]
    pub fn is_dropped(&self, original: usize) -> bool {
        self.dropped.contains(&original)
    }

    /// Iterate `(offset, originals)` in normalized order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.offsets.iter().map(Vec::as_slice).enumerate()
    }

    /// Every original index of `chars` is either anchored exactly once or
    /// dropped, never both.
    #[must_use]
    pub fn covers(&self, chars: &[PositionedCharacter]) -> bool {
        let mut seen = BTreeSet::new();
        for originals in &self.offsets {
            for &idx in originals {
                if !seen.insert(idx) || self.dropped.contains(&idx) {
                    return false;
                }
            }
        }
        seen.len() + self.dropped.len() == chars.len()
            && chars.iter().all(|c| {
                seen.contains(&c.original_index) || self.dropped.contains(&c.original_index)
            })
    }

    /// For offsets `i < j`, every original at `i` precedes every one at `j`.
    #[must_use]
    pub fn is_monotonic(&self) -> bool {
        self.offsets.windows(2).all(|pair| {
            match (pair[0].iter().max(), pair[1].iter().min()) {
                (Some(prev), Some(next)) => prev < next,
                _ => false,
            }
        })
    }

    pub(crate) fn push(&mut self, originals: Vec<usize>) {
        debug_assert!(!originals.is_empty());
        self.offsets.push(originals);
    }

    /// Record `original` as dropped at the current end of the normalized text.
    pub(crate) fn drop_at_end(&mut self, original: usize, kind: GapKind) {
        let boundary = self.offsets.len();
        let gap = self.gaps.entry(boundary).or_insert_with(|| Gap {
            kind,
            originals: Vec::new(),
        });
        if kind == GapKind::Merge {
            gap.kind = GapKind::Merge;
        }
        gap.originals.push(original);
        self.dropped.insert(original);
    }
}
