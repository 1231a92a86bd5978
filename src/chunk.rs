//! Bounded chunking of normalized text for the checkers.
//!
//! Checkers accept a few hundred characters per request. Chunks are cut
//! just after a word boundary so no token straddles two requests; each
//! chunk remembers its `base_offset` so chunk-local findings can be moved
//! back into normalized-text coordinates.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProofError, Result};
use crate::normalize::hangul::is_boundary;

/// Chunk sizing. Lengths are in characters, not bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    /// Maximum characters per chunk.
    pub max_chars: usize,
    /// How far back from `max_chars` to look for a word boundary before
    /// force-splitting.
    pub lookback: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chars: 300,
            lookback: 60,
        }
    }
}

/// One unit of work for a checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Position of this chunk in the document, starting at 0.
    pub index: usize,
    pub text: String,
    /// Normalized-text offset of the chunk's first character.
    pub base_offset: usize,
    /// Length in characters.
    pub len: usize,
    /// Whether the cut after this chunk fell inside a word.
    pub forced_split: bool,
}

impl Chunk {
    /// Chunks with nothing but whitespace are never sent to a checker.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkConfig,
}

impl Chunker {
    /// # Errors
    ///
    /// Returns [`ProofError::Config`] when `max_chars` is zero.
    pub fn new(config: ChunkConfig) -> Result<Self> {
        if config.max_chars == 0 {
            return Err(ProofError::Config("chunk.max_chars must be at least 1".into()));
        }
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Split `text` into ordered chunks whose concatenation is `text`.
    #[must_use]
    pub fn split(&self, text: &[char]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < text.len() {
            let (end, forced_split) = self.cut_point(text, start);
            chunks.push(Chunk {
                index: chunks.len(),
                text: text[start..end].iter().collect(),
                base_offset: start,
                len: end - start,
                forced_split,
            });
            start = end;
        }

        debug!(
            "Split {} chars into {} chunks (max {})",
            text.len(),
            chunks.len(),
            self.config.max_chars
        );
        chunks
    }

    /// End (exclusive) of the chunk starting at `start`.
    fn cut_point(&self, text: &[char], start: usize) -> (usize, bool) {
        let limit = start + self.config.max_chars;
        if limit >= text.len() {
            return (text.len(), false);
        }
        // Next chunk starting on a boundary splits no word.
        if is_boundary(text[limit]) {
            return (limit, false);
        }

        let floor = limit.saturating_sub(self.config.lookback).max(start);
        if let Some(j) = (floor..limit).rev().find(|&j| is_boundary(text[j])) {
            return (j + 1, false);
        }

        debug!(
            "No word boundary within {} chars of offset {}, forcing split",
            self.config.lookback, limit
        );
        (limit, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn chunker(max_chars: usize, lookback: usize) -> Chunker {
        Chunker::new(ChunkConfig {
            max_chars,
            lookback,
        })
        .unwrap()
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = chunker(300, 60).split(&chars("되요 오늘 날씨 좋다"));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].base_offset, 0);
        assert_eq!(chunks[0].len, 11);
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunker(300, 60).split(&[]).is_empty());
    }

    #[test]
    fn cuts_after_last_boundary() {
        let text = chars("가나다 라마바 사아자");
        let chunks = chunker(9, 5).split(&text);
        assert_eq!(chunks[0].text, "가나다 라마바 ");
        assert_eq!(chunks[1].text, "사아자");
        assert_eq!(chunks[1].base_offset, 8);
        assert!(!chunks[0].forced_split);
    }

    #[test]
    fn cuts_at_limit_when_next_char_is_boundary() {
        let chunks = chunker(3, 2).split(&chars("abc def"));
        assert_eq!(chunks[0].text, "abc");
        assert_eq!(chunks[1].text, " de");
        assert_eq!(chunks[2].text, "f");
    }

    #[test]
    fn forces_split_without_boundary() {
        let text = chars(&"가".repeat(25));
        let chunks = chunker(10, 4).split(&text);
        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].forced_split);
        assert_eq!(chunks[1].base_offset, 10);
        assert_eq!(chunks[2].len, 5);
    }

    #[test]
    fn punctuation_is_a_boundary() {
        let chunks = chunker(6, 6).split(&chars("끝났다.다음문장"));
        assert_eq!(chunks[0].text, "끝났다.");
    }

    #[test]
    fn concatenation_reproduces_text_and_offsets_line_up() {
        let sentence = "맞춤법 검사를 위한 긴 문장입니다. ";
        let text: Vec<char> = sentence.repeat(30).chars().take(620).collect();
        let chunks = chunker(300, 60).split(&text);

        let joined: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(joined, text.iter().collect::<String>());

        let mut expected = 0;
        for chunk in &chunks {
            assert_eq!(chunk.base_offset, expected);
            assert!(chunk.len <= 300);
            expected += chunk.len;
        }
        assert_eq!(expected, 620);
    }

    #[test]
    fn rejects_zero_size() {
        assert!(Chunker::new(ChunkConfig {
            max_chars: 0,
            lookback: 10
        })
        .is_err());
    }

    #[test]
    fn blank_chunks_are_detected() {
        let chunks = chunker(3, 0).split(&chars("ab    "));
        assert!(chunks.last().unwrap().is_blank());
    }
}
