//! Line-accumulating chunker.

use super::{slice_fixed, ChunkingConfig};
use tracing::debug;

/// Splits subtitle text into bounded chunks, line by line.
///
/// Lines keep their line breaks, so joining the chunks gives back the input.
#[derive(Debug, Clone, Default)]
pub struct LineChunker {
    config: ChunkingConfig,
}

impl LineChunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Split text into chunks in document order.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut buffer = String::new();
        let mut buffer_len = 0;

        for line in text.split_inclusive('\n') {
            let line_len = line.chars().count();

            if !buffer.is_empty() && buffer_len + line_len > self.config.flush_threshold {
                chunks.extend(slice_fixed(&buffer, self.config.chunk_size));
                buffer.clear();
                buffer_len = 0;
            }

            buffer.push_str(line);
            buffer_len += line_len;
        }

        if !buffer.is_empty() {
            chunks.extend(slice_fixed(&buffer, self.config.chunk_size));
        }

        debug!(
            "Split {} characters into {} chunks",
            text.chars().count(),
            chunks.len()
        );
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(flush_threshold: usize, chunk_size: usize) -> LineChunker {
        LineChunker::new(ChunkingConfig {
            flush_threshold,
            chunk_size,
        })
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunks = LineChunker::default().chunk("Hello\nWorld\n");
        assert_eq!(chunks, vec!["Hello\nWorld\n".to_string()]);
    }

    #[test]
    fn test_empty_input() {
        assert!(LineChunker::default().chunk("").is_empty());
    }

    #[test]
    fn test_round_trip() {
        let text = "first line\nsecond line\n\nthird line without newline";
        let chunks = chunker(15, 10).chunk(text);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_flush_when_next_line_overflows() {
        // "aaaa\n" (5) + "bbbb\n" (5) fits in 10, "cccc\n" would make 15.
        let chunks = chunker(10, 100).chunk("aaaa\nbbbb\ncccc\n");
        assert_eq!(chunks, vec!["aaaa\nbbbb\n", "cccc\n"]);
    }

    #[test]
    fn test_long_line_waits_for_next_line_then_slices() {
        let long = "x".repeat(25);
        let text = format!("{}\nshort\n", long);
        let chunks = chunker(10, 8).chunk(&text);

        // 26 chars of the long line are flushed together and sliced at 8.
        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[0], "x".repeat(8));
        assert_eq!(chunks[3], "x\n");
        assert_eq!(chunks[4], "short\n");
        assert!(chunks.iter().all(|c| c.chars().count() <= 8));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_no_chunk_exceeds_slice_size() {
        let text: String = (0..200)
            .map(|i| format!("caption line number {} with some words\n", i))
            .collect();
        let chunks = LineChunker::default().chunk(&text);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 1000));
        assert!(chunks.iter().all(|c| !c.is_empty()));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_multibyte_text_round_trips() {
        let text = "안녕하세요 여러분\n오늘은 번역을 합니다\n".repeat(40);
        let chunks = chunker(50, 30).chunk(&text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 30));
        assert_eq!(chunks.concat(), text);
    }
}
