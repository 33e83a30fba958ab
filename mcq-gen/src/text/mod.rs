//! Text processing: chunking source text for generation.

pub mod chunker;

pub use chunker::{DEFAULT_MAX_CHUNK_SIZE, chunk_text};
