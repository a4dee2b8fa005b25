//! Offline dry run: how a raw report would be chunked and cleaned.

use std::path::Path;

use tracing::instrument;

use reconreport_markdown::{clean_chunk, split};
use reconreport_shared::{ReconReportError, Result};

/// Per-chunk statistics, computed without any remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPreview {
    pub index: usize,
    pub raw_chars: usize,
    pub cleaned_chars: usize,
    pub raw_lines: usize,
    pub kept_lines: usize,
}

impl ChunkPreview {
    /// Whether `generate` would send this chunk.
    pub fn would_send(&self) -> bool {
        self.kept_lines > 0
    }
}

/// Chunk and clean `text` with `limit`.
pub fn preview(text: &str, limit: usize) -> Vec<ChunkPreview> {
    split(text, limit)
        .into_iter()
        .map(|chunk| {
            let cleaned = clean_chunk(&chunk.text);
            ChunkPreview {
                index: chunk.index,
                raw_chars: chunk.char_len(),
                cleaned_chars: cleaned.chars().count(),
                raw_lines: chunk.text.lines().count(),
                kept_lines: cleaned.lines().filter(|l| !l.trim().is_empty()).count(),
            }
        })
        .collect()
}

/// Read `path` and preview it.
#[instrument(skip_all, fields(path = %path.display(), limit = limit))]
pub fn preview_file(path: &Path, limit: usize) -> Result<Vec<ChunkPreview>> {
    let raw =
        std::fs::read_to_string(path).map_err(|e| ReconReportError::input_missing(path, e))?;
    Ok(preview(&raw, limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_dropped_lines() {
        let raw = "Server: nginx\nConnection timeout\nUnable to find WordPress";
        let chunks = preview(raw, 5000);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].raw_lines, 3);
        assert_eq!(chunks[0].kept_lines, 2);
        assert!(chunks[0].would_send());
    }

    #[test]
    fn fully_filtered_chunk_is_not_sent() {
        let chunks = preview("error error error\nServer: nginx", 17);
        assert_eq!(chunks.len(), 2);
        assert!(!chunks[0].would_send());
        assert_eq!(chunks[0].cleaned_chars, 0);
        assert!(chunks[1].would_send());
    }

    #[test]
    fn missing_file() {
        let path = std::env::temp_dir().join(format!("rr-preview-{}.txt", uuid::Uuid::now_v7()));
        let err = preview_file(&path, 5000).unwrap_err();
        assert!(matches!(err, ReconReportError::InputMissing { .. }));
    }
}
