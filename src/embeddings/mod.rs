// Embeddings module
// Sliding-window chunking plus the embedding provider seam and its Gemini client

pub mod chunking;
pub mod gemini;
pub mod provider;

pub use chunking::{ChunkingConfig, TextChunk, chunk_text, estimate_token_count};
pub use gemini::GeminiClient;
pub use provider::{EmbeddingProvider, EmbeddingTask};
