use serde::{Deserialize, Serialize};

/// Outcome of one repository indexing pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Files chunked and stored
    pub files: usize,

    /// Chunks written to the embedding store
    pub chunks: usize,

    /// Files skipped (unreadable, non-UTF-8 or fully deduplicated)
    pub skipped: usize,

    /// Wall-clock duration of the pass
    pub time_ms: u64,
}

impl std::fmt::Display for IndexStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "files: {} | chunks: {} | skipped: {} | {}ms",
            self.files, self.chunks, self.skipped, self.time_ms
        )
    }
}
