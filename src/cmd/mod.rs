pub mod check;
pub mod normalize;
pub mod output;
pub mod providers;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use proofmark::document::{from_plain_text, PositionedCharacter};
use proofmark::extract;

/// Load a character stream from a path, or from stdin when `input` is "-".
///
/// Stdin holding a JSON array is read as a character dump, anything else as
/// plain text.
pub fn load_input(input: &str) -> Result<Vec<PositionedCharacter>> {
    if input != "-" {
        return extract::from_path(Path::new(input));
    }

    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("failed to read stdin")?;
    if text.trim_start().starts_with('[') {
        extract::from_json_str(&text)
    } else {
        Ok(from_plain_text(&text))
    }
}
