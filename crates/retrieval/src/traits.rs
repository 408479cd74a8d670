use crate::document::Document;
use async_trait::async_trait;

/// One edge in the precomputed symbol graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEdge {
    pub file_path: String,
    pub chunk_index: i64,
    pub chunk_hash: String,
    /// `CALLS` or `CALLED_BY`
    pub relation: String,
    pub symbol_fqn: String,
    pub referenced_symbol_fqn: String,
}

/// Access to previously indexed chunks, keyed the way the mapper stores them.
///
/// Implemented outside this crate (vector store, relational store, ...);
/// neighbor expansion only borrows already-indexed documents through it.
pub trait ChunkLookup: Send + Sync {
    /// All chunks of one file, any order
    fn find_by_file(&self, namespace: &str, file_path: &str) -> Vec<Document>;

    /// Chunks of one file with the given chunk indexes
    fn find_by_chunk_indexes(
        &self,
        namespace: &str,
        file_path: &str,
        chunk_indexes: &[i64],
    ) -> Vec<Document>;
}

/// Access to the namespace-wide symbol graph
pub trait SymbolGraph: Send + Sync {
    /// Whether graph data has been built for the namespace
    fn is_ready(&self, namespace: &str) -> bool;

    /// Outgoing references of a symbol, in graph order
    fn find_referenced_symbols(&self, namespace: &str, symbol_fqn: &str) -> Vec<SymbolEdge>;
}

/// Minimal language-model seam used by snippet compression
#[async_trait]
pub trait LanguageModelClient: Send + Sync {
    async fn complete(&self, system_instructions: &str, user_prompt: &str)
        -> anyhow::Result<String>;
}
