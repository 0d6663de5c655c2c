
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Represents a chunk of source text ready for embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// The trimmed chunk text
    pub content: String,
    /// Dense, zero-based position of this chunk within its source
    pub chunk_index: usize,
    /// Character offset of the window this chunk was cut from
    pub start_offset: usize,
    /// Estimated token count
    pub token_count: usize,
}

/// Configuration for sliding-window chunking, measured in characters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target window size
    pub chunk_size: usize,
    /// Characters shared between adjacent windows
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Split text into overlapping chunks.
///
/// Windows of `chunk_size` characters are cut from left to right. A window
/// that does not reach the end of the text is shortened to end just after
/// its last sentence terminator, newline or space, as long as that break
/// lies past the window's midpoint. Each window is trimmed; windows that
/// trim to nothing are dropped without consuming an index.
#[inline]
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<TextChunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let chunk_size = config.chunk_size.max(1);

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < total {
        let mut end = (start + chunk_size).min(total);

        if end < total {
            if let Some(cut) = find_break(&chars[start..end]) {
                if cut > (end - start) / 2 {
                    end = start + cut + 1;
                }
            }
        }

        let window: String = chars[start..end].iter().collect();
        let content = window.trim();
        if !content.is_empty() {
            chunks.push(TextChunk {
                content: content.to_string(),
                chunk_index: chunks.len(),
                start_offset: start,
                token_count: estimate_token_count(content),
            });
        }

        if end >= total {
            break;
        }

        let emitted = end - start;
        start += emitted - config.chunk_overlap.min(emitted / 2);
    }

    debug!(
        "Chunked {} characters into {} chunks (size {}, overlap {})",
        total,
        chunks.len(),
        chunk_size,
        config.chunk_overlap
    );

    chunks
}

/// Position of the last break character in the window, if any
fn find_break(window: &[char]) -> Option<usize> {
    window.iter().rposition(|c| is_break_char(*c))
}

const fn is_break_char(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '\n' | ' ')
}

/// Estimate token count as one token per four characters, rounded up
#[inline]
pub fn estimate_token_count(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}
