//! Text chunking for translation and indexing.
//!
//! Two splitters live here: the line-accumulating chunker that feeds the
//! translation pipeline, and an overlapping window splitter used when
//! building the translation index.

mod lines;
mod window;

pub use lines::LineChunker;
pub use window::overlapping_windows;

use crate::config::ChunkingSettings;
use serde::{Deserialize, Serialize};

/// Configuration for the line-accumulating chunker.
///
/// The flush threshold and the slice size are independent: a buffer is
/// flushed once the next line would push it past `flush_threshold`, and
/// every flushed buffer is then hard-sliced at `chunk_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Buffer length in characters that triggers a flush.
    pub flush_threshold: usize,
    /// Maximum characters per emitted chunk.
    pub chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            flush_threshold: 700,
            chunk_size: 1000,
        }
    }
}

impl From<&ChunkingSettings> for ChunkingConfig {
    fn from(settings: &ChunkingSettings) -> Self {
        Self {
            flush_threshold: settings.flush_threshold,
            chunk_size: settings.chunk_size,
        }
    }
}

/// Slice text into pieces of exactly `size` characters (the last may be shorter).
///
/// Counts Unicode scalar values, so a multi-byte character is never split.
pub fn slice_fixed(text: &str, size: usize) -> Vec<String> {
    let size = size.max(1);
    let mut slices = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == size {
            slices.push(std::mem::take(&mut current));
            count = 0;
        }
    }

    if !current.is_empty() {
        slices.push(current);
    }

    slices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_fixed_exact_sizes() {
        let slices = slice_fixed("abcdefg", 3);
        assert_eq!(slices, vec!["abc", "def", "g"]);
    }

    #[test]
    fn test_slice_fixed_empty() {
        assert!(slice_fixed("", 10).is_empty());
    }

    #[test]
    fn test_slice_fixed_counts_characters() {
        let slices = slice_fixed("안녕하세요", 2);
        assert_eq!(slices, vec!["안녕", "하세", "요"]);
    }
}
