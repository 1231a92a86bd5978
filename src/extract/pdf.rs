//! Character extraction from PDF via `pdfium-render`.
//!
//! Requires the pdfium dynamic library at runtime.

use anyhow::{Context, Result};
use pdfium_render::prelude::*;

use super::{assemble, RawGlyph};
use crate::document::{BoundingBox, PositionedCharacter};

/// Extract every character with its bounding box, in pdfium's reading order.
///
/// Glyphs pdfium cannot box (generated spaces, some ligatures) get an empty
/// box so they still take part in normalization.
#[allow(deprecated)] // PdfRect field access deprecated in 0.8.28, removed in 0.9.0
pub fn extract(bytes: &[u8]) -> Result<Vec<PositionedCharacter>> {
    let pdfium = Pdfium::default();
    let doc = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .context("Failed to parse PDF")?;

    let mut glyphs = Vec::new();
    for (page_index, page) in doc.pages().iter().enumerate() {
        let text = page
            .text()
            .with_context(|| format!("Failed to extract text from page {page_index}"))?;
        for ch in text.chars().iter() {
            let Some(value) = ch.unicode_char() else {
                continue;
            };
            let bbox = ch.tight_bounds().map_or_else(
                |_| BoundingBox::default(),
                |rect| {
                    BoundingBox::new(
                        rect.left.value,
                        rect.bottom.value,
                        (rect.right.value - rect.left.value).abs(),
                        (rect.top.value - rect.bottom.value).abs(),
                    )
                },
            );
            glyphs.push(RawGlyph {
                page_index,
                value,
                bbox,
            });
        }
    }

    let chars = assemble(glyphs);
    tracing::debug!(
        "Extracted {} characters from {} pages",
        chars.len(),
        doc.pages().len()
    );
    Ok(chars)
}
