//! Character streams from documents.
//!
//! - JSON dumps (an array of [`PositionedCharacter`] objects), always available
//! - PDF via pdfium, behind the `pdf` feature
//! - plain text on a synthetic grid, see [`from_plain_text`](crate::document::from_plain_text)

#[cfg(feature = "pdf")]
pub mod pdf;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use crate::document::{BoundingBox, PositionedCharacter};

/// Read a JSON character dump.
///
/// # Errors
///
/// Returns an error if the reader fails or the JSON does not describe a
/// character array.
pub fn from_json_reader<R: Read>(reader: R) -> Result<Vec<PositionedCharacter>> {
    serde_json::from_reader(reader).context("invalid character dump")
}

/// # Errors
///
/// Returns an error if `json` does not describe a character array.
pub fn from_json_str(json: &str) -> Result<Vec<PositionedCharacter>> {
    serde_json::from_str(json).context("invalid character dump")
}

/// Load characters from a file, picking the reader from the extension.
///
/// `.json` is a character dump, `.pdf` needs the `pdf` feature, anything
/// else is read as plain text.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn from_path(path: &Path) -> Result<Vec<PositionedCharacter>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("json") => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            from_json_reader(std::io::BufReader::new(file))
                .with_context(|| format!("failed to load {}", path.display()))
        }
        Some("pdf") => from_pdf_path(path),
        _ => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok(crate::document::from_plain_text(&text))
        }
    }
}

#[cfg(feature = "pdf")]
fn from_pdf_path(path: &Path) -> Result<Vec<PositionedCharacter>> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    pdf::extract(&bytes)
}

#[cfg(not(feature = "pdf"))]
fn from_pdf_path(path: &Path) -> Result<Vec<PositionedCharacter>> {
    anyhow::bail!(
        "{}: PDF input requires building with --features pdf",
        path.display()
    )
}

/// A glyph as an extractor sees it, before line breaks are made explicit.
#[derive(Debug, Clone, Copy)]
pub struct RawGlyph {
    pub page_index: usize,
    pub value: char,
    pub bbox: BoundingBox,
}

/// Number glyphs in reading order and make line structure explicit.
///
/// A `\n` with an empty box is inserted wherever the text moves to a new
/// line or page without the extractor having emitted a break itself.
/// Extractor-emitted `\r`/`\n` are kept, with their geometry cleared.
#[must_use]
pub fn assemble(glyphs: impl IntoIterator<Item = RawGlyph>) -> Vec<PositionedCharacter> {
    fn push(out: &mut Vec<PositionedCharacter>, page: usize, value: char, bbox: BoundingBox) {
        let index = out.len();
        out.push(PositionedCharacter::new(page, index, value, bbox));
    }

    let mut out: Vec<PositionedCharacter> = Vec::new();
    let mut last_box: Option<(usize, BoundingBox)> = None;

    for glyph in glyphs {
        if matches!(glyph.value, '\r' | '\n') {
            push(&mut out, glyph.page_index, glyph.value, BoundingBox::default());
            last_box = None;
            continue;
        }
        if let Some((page, prev)) = last_box {
            let wrapped = page != glyph.page_index || !prev.same_line(&glyph.bbox);
            if wrapped {
                push(&mut out, page, '\n', BoundingBox::default());
            }
        }
        push(&mut out, glyph.page_index, glyph.value, glyph.bbox);
        if !glyph.bbox.is_empty() {
            last_box = Some((glyph.page_index, glyph.bbox));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(page_index: usize, value: char, x: f32, y: f32) -> RawGlyph {
        RawGlyph {
            page_index,
            value,
            bbox: BoundingBox::new(x, y, 10.0, 12.0),
        }
    }

    #[test]
    fn parse_json_dump() {
        let json = r#"[
            {"page_index": 0, "original_index": 0, "value": "되", "bbox": {"x": 0, "y": 0, "width": 10, "height": 12}},
            {"page_index": 0, "original_index": 1, "value": "요"}
        ]"#;
        let chars = from_json_str(json).unwrap();
        assert_eq!(chars.len(), 2);
        assert_eq!(chars[0].bbox.width, 10.0);
        assert!(chars[1].bbox.is_empty());
    }

    #[test]
    fn invalid_dump_is_an_error() {
        let err = from_json_str(r#"{"value": "x"}"#).unwrap_err();
        assert!(err.to_string().contains("invalid character dump"));
    }

    #[test]
    fn reader_and_str_agree() {
        let json = r#"[{"page_index": 1, "original_index": 7, "value": "가"}]"#;
        let a = from_json_str(json).unwrap();
        let b = from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn assemble_inserts_breaks_on_line_change() {
        let chars = assemble([
            glyph(0, '안', 0.0, 100.0),
            glyph(0, '녕', 10.0, 100.0),
            glyph(0, '하', 0.0, 80.0),
            glyph(1, '요', 0.0, 100.0),
        ]);
        let text: String = chars.iter().map(|c| c.value).collect();
        assert_eq!(text, "안녕\n하\n요");
        assert!(chars.windows(2).all(|w| w[0].original_index < w[1].original_index));
        assert!(chars[2].bbox.is_empty());
        assert_eq!(chars[4].page_index, 0);
        assert_eq!(chars[5].page_index, 1);
    }

    #[test]
    fn assemble_keeps_extractor_breaks_without_doubling() {
        let chars = assemble([
            glyph(0, '가', 0.0, 100.0),
            RawGlyph {
                page_index: 0,
                value: '\n',
                bbox: BoundingBox::new(10.0, 100.0, 0.0, 12.0),
            },
            glyph(0, '나', 0.0, 80.0),
        ]);
        let text: String = chars.iter().map(|c| c.value).collect();
        assert_eq!(text, "가\n나");
        assert!(chars[1].bbox.is_empty());
    }

    #[test]
    fn plain_text_files_use_the_grid() {
        let dir = std::env::temp_dir().join(format!("proofmark-extract-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("input.txt");
        std::fs::write(&path, "되요").unwrap();
        let chars = from_path(&path).unwrap();
        assert_eq!(chars.len(), 2);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
