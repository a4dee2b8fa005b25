//! Text handling on both sides of the completion call.
//!
//! - [`chunker`] splits the raw recon dump into word-aligned, bounded chunks
//! - [`cleanup`] drops noise lines from each chunk before it is sent
//! - [`table`] parses the Markdown the model sends back into rows and tool names

pub mod chunker;
pub mod cleanup;
pub mod table;

pub use chunker::{Chunk, DEFAULT_CHUNK_LIMIT, split};
pub use cleanup::{WORDPRESS_REPLACEMENT, clean_chunk};
pub use table::{ParsedCompletion, parse_completion, parse_rows, parse_tools};

use tracing::debug;

/// Split `text` and run the cleanup filter on every chunk independently.
///
/// Cleanup happens after splitting, so dropped lines never move chunk boundaries.
pub fn prepare_chunks(text: &str, limit: usize) -> Vec<Chunk> {
    let chunks: Vec<Chunk> = split(text, limit)
        .into_iter()
        .map(|chunk| Chunk {
            index: chunk.index,
            text: clean_chunk(&chunk.text),
        })
        .collect();

    debug!(chunks = chunks.len(), limit, "prepared chunks");
    chunks
}
