//! Sliding-window text chunker
//!
//! Splits extracted document text into overlapping, character-addressed
//! windows. Chunk `i` covers characters
//! `[i * (size - overlap), i * (size - overlap) + size)`; the final chunk
//! may be shorter. Adjacent chunks share exactly `chunk_overlap`
//! characters so sentence fragments at a boundary stay retrievable.

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Configuration for chunking
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Window size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Overlap between consecutive windows in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    100
}

impl ChunkingConfig {
    /// Create a new chunking configuration
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Validate the configuration.
    ///
    /// An overlap at or above the window size would keep the window from
    /// ever advancing, so it is rejected as a configuration error rather
    /// than tolerated at runtime.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.chunk_size == 0 {
            return Err(DomainError::configuration(
                "chunk_size must be greater than 0",
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(DomainError::configuration(
                "chunk_overlap must be less than chunk_size",
            ));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

/// Split text into overlapping windows, in document order.
///
/// Empty input yields an empty sequence. Offsets are character-addressed,
/// so multi-byte text never splits inside a code point.
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Result<Vec<String>, DomainError> {
    config.validate()?;

    if text.is_empty() {
        return Ok(Vec::new());
    }

    let step = config.chunk_size - config.chunk_overlap;
    let byte_offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let char_len = byte_offsets.len();

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < char_len {
        let end = (start + config.chunk_size).min(char_len);
        let byte_start = byte_offsets[start];
        let byte_end = if end == char_len {
            text.len()
        } else {
            byte_offsets[end]
        };

        chunks.push(text[byte_start..byte_end].to_string());
        start += step;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn char_len(s: &str) -> usize {
        s.chars().count()
    }

    /// One chunk per window start below the text length:
    /// ceil(len / (size - overlap)) for non-empty text.
    fn expected_count(len: usize, config: &ChunkingConfig) -> usize {
        let step = config.chunk_size - config.chunk_overlap;
        len.div_ceil(step)
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunks = chunk_text("", &ChunkingConfig::default()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunk_text("hello world", &ChunkingConfig::default()).unwrap();
        assert_eq!(chunks, vec!["hello world"]);
    }

    #[test]
    fn test_text_exactly_one_window() {
        // With overlap > 0, a text exactly one window long still gets a
        // second window start (at 900), carrying the final 100 chars.
        let text = "a".repeat(1000);
        let chunks = chunk_text(&text, &ChunkingConfig::default()).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(char_len(&chunks[0]), 1000);
        assert_eq!(char_len(&chunks[1]), 100);
    }

    #[test]
    fn test_window_positions_and_lengths() {
        // 2500 chars with the default 1000/100 parameters: windows start at
        // 0, 900 and 1800, so the last one holds the remaining 700 chars.
        let text: String = (0..2500).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let config = ChunkingConfig::default();
        let chunks = chunk_text(&text, &config).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(char_len(&chunks[0]), 1000);
        assert_eq!(char_len(&chunks[1]), 1000);
        assert_eq!(char_len(&chunks[2]), 700);
    }

    #[test]
    fn test_chunk_count_per_window_start() {
        let config = ChunkingConfig::new(100, 20);
        for len in [0usize, 1, 20, 80, 99, 100, 101, 180, 181, 500, 1234] {
            let text = "x".repeat(len);
            let chunks = chunk_text(&text, &config).unwrap();
            assert_eq!(
                chunks.len(),
                expected_count(len, &config),
                "wrong chunk count for len={}",
                len
            );
        }
    }

    #[test]
    fn test_overlap_invariant() {
        let text: String = (0..1000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let config = ChunkingConfig::new(100, 30);
        let chunks = chunk_text(&text, &config).unwrap();
        assert!(chunks.len() > 2);

        // Adjacent chunks share exactly `overlap` characters; the final
        // chunk may be too short to carry a full head, so it is excluded.
        for pair in chunks[..chunks.len() - 1].windows(2) {
            let tail: String = pair[0]
                .chars()
                .skip(char_len(&pair[0]) - config.chunk_overlap)
                .collect();
            let head: String = pair[1].chars().take(config.chunk_overlap).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_multibyte_text_splits_on_char_boundaries() {
        let text = "héllo wörld ünïcode ".repeat(20);
        let config = ChunkingConfig::new(50, 10);
        let chunks = chunk_text(&text, &config).unwrap();

        assert_eq!(chunks.len(), expected_count(char_len(&text), &config));
        for chunk in &chunks[..chunks.len() - 1] {
            assert_eq!(char_len(chunk), 50);
        }
    }

    #[test]
    fn test_overlap_must_be_less_than_size() {
        let err = chunk_text("abc", &ChunkingConfig::new(10, 10)).unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));

        let err = chunk_text("abc", &ChunkingConfig::new(10, 11)).unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let err = ChunkingConfig::new(0, 0).validate().unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }
}
