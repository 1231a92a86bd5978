//! Positioned characters as produced by an extractor.
//!
//! A document enters the pipeline as an ordered sequence of
//! [`PositionedCharacter`]s in reading order. Everything downstream refers
//! back to characters by their `original_index`.

use serde::{Deserialize, Serialize};

use crate::error::ProofError;

/// Axis-aligned rectangle in page coordinates (PDF points).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f32,
    /// Bottom edge (PDF pages use a bottom-up coordinate system).
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[must_use]
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Vertical midpoint, used to decide whether two glyphs share a line.
    #[must_use]
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Zero-area boxes carry no geometry (synthetic line breaks, OCR gaps).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }

    /// Smallest box containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        BoundingBox {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.top().max(other.top()) - y,
        }
    }

    /// Whether two boxes sit on the same text line.
    ///
    /// Centers closer than half the taller box count as one line.
    #[must_use]
    pub fn same_line(&self, other: &BoundingBox) -> bool {
        let tolerance = self.height.max(other.height) / 2.0;
        (self.center_y() - other.center_y()).abs() <= tolerance
    }
}

/// A single character with its page and geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedCharacter {
    /// Page index (0-based).
    pub page_index: usize,
    /// Position in document reading order. Strictly increasing, unique.
    pub original_index: usize,
    pub value: char,
    #[serde(rename = "bbox", default)]
    pub bbox: BoundingBox,
}

impl PositionedCharacter {
    #[must_use]
    pub fn new(page_index: usize, original_index: usize, value: char, bbox: BoundingBox) -> Self {
        Self {
            page_index,
            original_index,
            value,
            bbox,
        }
    }

    /// Line-break markers never contribute geometry to an annotation.
    #[must_use]
    pub fn is_line_break(&self) -> bool {
        matches!(self.value, '\n' | '\r')
    }
}

/// Check that `original_index` is strictly increasing across the stream.
///
/// # Errors
///
/// Returns [`ProofError::MalformedInput`] naming the first offending position.
pub fn validate_order(chars: &[PositionedCharacter]) -> Result<(), ProofError> {
    for (position, pair) in chars.windows(2).enumerate() {
        if pair[1].original_index <= pair[0].original_index {
            return Err(ProofError::MalformedInput {
                position: position + 1,
                previous: pair[0].original_index,
                found: pair[1].original_index,
            });
        }
    }
    Ok(())
}

/// Find a character by its `original_index` in a validated stream.
#[must_use]
pub fn lookup(chars: &[PositionedCharacter], original_index: usize) -> Option<&PositionedCharacter> {
    position(chars, original_index).map(|i| &chars[i])
}

/// Stream position of the character with `original_index`.
#[must_use]
pub fn position(chars: &[PositionedCharacter], original_index: usize) -> Option<usize> {
    chars
        .binary_search_by_key(&original_index, |c| c.original_index)
        .ok()
}

/// Build a single-page stream from plain text, one box per character on a
/// fixed grid. Handy for tests and for feeding text that has no geometry.
#[must_use]
pub fn from_plain_text(text: &str) -> Vec<PositionedCharacter> {
    const ADVANCE: f32 = 10.0;
    const LINE_HEIGHT: f32 = 12.0;

    let mut line = 0usize;
    let mut column = 0usize;
    text.chars()
        .enumerate()
        .map(|(i, value)| {
            let bbox = BoundingBox::new(
                column as f32 * ADVANCE,
                -(line as f32) * LINE_HEIGHT * 1.5,
                ADVANCE,
                LINE_HEIGHT,
            );
            if value == '\n' {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
            PositionedCharacter::new(0, i, value, bbox)
        })
        .collect()
}
