//! Position-preserving text normalization.
//!
//! Turns the extractor's raw character stream into text a checker can read
//! (hyphenated words rejoined, line wraps removed, split postpositions
//! repaired, whitespace collapsed) while recording, for every normalized
//! offset, the original characters it came from.
//!
//! # Pipeline
//!
//! ```text
//! PositionedCharacter[] → single left-to-right pass → (text, AnchorMap)
//! ```
//!
//! The pass looks at most a few characters ahead (a CRLF pair plus the
//! longest postposition) and never backtracks.

pub mod anchor;
pub mod hangul;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::{validate_order, PositionedCharacter};
use crate::error::Result;

pub use anchor::{AnchorMap, Gap, GapKind};
use hangul::{attaches_to, is_boundary, is_hangul, is_pdf_marker, is_sentence_terminator};

/// Which repairs the normalizer applies. All enabled by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Join `word-\nword` across the hyphen and break.
    pub merge_hyphenation: bool,
    /// Join Hangul split by a bare line wrap.
    pub merge_line_breaks: bool,
    /// Remove a stray space before a Korean postposition.
    pub merge_postpositions: bool,
    /// Collapse whitespace runs to a single space.
    pub collapse_whitespace: bool,
    /// Drop control characters.
    pub strip_control: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            merge_hyphenation: true,
            merge_line_breaks: true,
            merge_postpositions: true,
            collapse_whitespace: true,
            strip_control: true,
        }
    }
}

/// Normalized text together with its anchor map.
#[derive(Debug, Clone, Serialize)]
pub struct Normalized {
    text: String,
    #[serde(skip)]
    chars: Vec<char>,
    anchors: AnchorMap,
}

impl Normalized {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Normalized text as characters; offsets everywhere index into this.
    #[must_use]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    #[must_use]
    pub fn anchors(&self) -> &AnchorMap {
        &self.anchors
    }

    /// Length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Text of `[start, end)`, clamped to the text.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        let start = start.min(end);
        self.chars[start..end].iter().collect()
    }
}

/// Counters for one normalization pass, logged at debug level.
#[derive(Debug, Default, Clone, Copy)]
struct MergeStats {
    hyphens: usize,
    wraps: usize,
    postpositions: usize,
    noise: usize,
}

/// Applies the merge and repair rules in one pass.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizeConfig,
}

impl Normalizer {
    #[must_use]
    pub fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }

    /// Normalize one document's character stream.
    ///
    /// # Errors
    ///
    /// Returns [`ProofError::MalformedInput`](crate::error::ProofError) if
    /// `original_index` is not strictly increasing.
    pub fn normalize(&self, chars: &[PositionedCharacter]) -> Result<Normalized> {
        validate_order(chars)?;

        let values: Vec<char> = chars.iter().map(|c| c.value).collect();
        let mut pass = Pass {
            config: &self.config,
            chars,
            values: &values,
            out: Vec::with_capacity(values.len()),
            anchors: AnchorMap::default(),
            stats: MergeStats::default(),
        };
        pass.run();

        let Pass {
            out, anchors, stats, ..
        } = pass;
        debug!(
            "Normalized {} chars to {} (hyphen merges: {}, wrap merges: {}, postposition repairs: {}, noise dropped: {})",
            chars.len(),
            out.len(),
            stats.hyphens,
            stats.wraps,
            stats.postpositions,
            stats.noise
        );

        Ok(Normalized {
            text: out.iter().collect(),
            chars: out,
            anchors,
        })
    }
}

/// Working state of a single normalization pass.
struct Pass<'a> {
    config: &'a NormalizeConfig,
    chars: &'a [PositionedCharacter],
    values: &'a [char],
    out: Vec<char>,
    anchors: AnchorMap,
    stats: MergeStats,
}

impl Pass<'_> {
    fn run(&mut self) {
        let mut i = 0;
        while i < self.values.len() {
            i = self.step(i);
        }
    }

    /// Handle the character at `i`; returns the next position to visit.
    fn step(&mut self, i: usize) -> usize {
        let c = self.values[i];

        if self.config.strip_control && c.is_control() && !matches!(c, '\n' | '\r' | '\t') {
            self.discard(i, GapKind::Noise);
            self.stats.noise += 1;
            return i + 1;
        }

        if c == '-' && self.config.merge_hyphenation {
            if let Some(next) = self.hyphen_merge(i) {
                return next;
            }
        }

        if let Some(len) = self.line_break_len(i) {
            if self.config.merge_line_breaks {
                if let Some(next) = self.wrap_merge(i, len) {
                    return next;
                }
            }
            // Unmerged break: the last character of the marker becomes a
            // space, the `\r` of a `\r\n` pair is dropped as noise.
            let last = i + len - 1;
            for j in i..last {
                self.discard(j, GapKind::Noise);
            }
            if self.config.collapse_whitespace && self.last_is_space() {
                self.discard(last, GapKind::Noise);
                self.stats.noise += len;
            } else {
                self.emit(' ', vec![last]);
                self.stats.noise += len - 1;
            }
            return i + len;
        }

        if c == ' ' && self.config.merge_postpositions && self.postposition_split(i) {
            self.discard(i, GapKind::Merge);
            self.stats.postpositions += 1;
            return i + 1;
        }

        if c.is_whitespace() || is_pdf_marker(c) {
            if self.config.collapse_whitespace && self.last_is_space() {
                self.discard(i, GapKind::Noise);
                self.stats.noise += 1;
            } else {
                self.emit(' ', vec![i]);
            }
            return i + 1;
        }

        self.emit(c, vec![i]);
        i + 1
    }

    /// `-` + line break + text: drop hyphen and break, join the halves.
    fn hyphen_merge(&mut self, i: usize) -> Option<usize> {
        let before = *self.out.last()?;
        if before.is_whitespace() {
            return None;
        }
        let len = self.line_break_len(i + 1)?;
        let after = i + 1 + len;
        let next = *self.values.get(after)?;
        if next.is_whitespace() {
            return None;
        }
        for j in i..after {
            self.discard(j, GapKind::Merge);
        }
        self.stats.hyphens += 1;
        Some(after)
    }

    /// Hangul + bare line break + Hangul, not right after a sentence end.
    fn wrap_merge(&mut self, i: usize, len: usize) -> Option<usize> {
        let before = *self.out.last()?;
        let after = i + len;
        let next = *self.values.get(after)?;
        if !is_hangul(before) || !is_hangul(next) || self.recent_sentence_end() {
            return None;
        }
        for j in i..after {
            self.discard(j, GapKind::Merge);
        }
        self.stats.wraps += 1;
        Some(after)
    }

    /// Single space between a Hangul stem and a whole-token postposition.
    fn postposition_split(&self, i: usize) -> bool {
        let stem_start = self
            .out
            .iter()
            .rposition(|&c| is_boundary(c))
            .map_or(0, |p| p + 1);
        attaches_to(&self.out[stem_start..], &self.values[i + 1..])
    }

    /// Length of the line-break marker starting at `i` (`\n`, `\r`, `\r\n`).
    fn line_break_len(&self, i: usize) -> Option<usize> {
        match self.values.get(i)? {
            '\n' => Some(1),
            '\r' if self.values.get(i + 1) == Some(&'\n') => Some(2),
            '\r' => Some(1),
            _ => None,
        }
    }

    fn recent_sentence_end(&self) -> bool {
        self.out
            .iter()
            .rev()
            .take(4)
            .any(|&c| is_sentence_terminator(c))
    }

    fn last_is_space(&self) -> bool {
        self.out.last() == Some(&' ')
    }

    fn emit(&mut self, value: char, positions: Vec<usize>) {
        self.out.push(value);
        self.anchors.push(
            positions
                .into_iter()
                .map(|p| self.chars[p].original_index)
                .collect(),
        );
    }

    fn discard(&mut self, position: usize, kind: GapKind) {
        self.anchors
            .drop_at_end(self.chars[position].original_index, kind);
    }
}

/// Whether the normalized character at `offset` is a token boundary.
#[must_use]
pub fn is_token_boundary(normalized: &Normalized, offset: usize) -> bool {
    normalized
        .chars()
        .get(offset)
        .is_none_or(|&c| is_boundary(c))
}
