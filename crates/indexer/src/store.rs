use async_trait::async_trait;
use coderag_retrieval::{Document, SymbolEdge};

/// Embedding/vector store boundary.
///
/// The indexer produces documents; embedding computation and persistence live
/// behind this trait and are implemented elsewhere.
#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    async fn add(&self, documents: Vec<Document>) -> anyhow::Result<()>;

    async fn delete_by_ids(&self, ids: &[String]) -> anyhow::Result<()>;

    /// Atomically replace every document of a namespace
    async fn replace_namespace(
        &self,
        namespace: &str,
        documents: Vec<Document>,
    ) -> anyhow::Result<()>;
}

/// Persistence boundary for symbol-graph edges
#[async_trait]
pub trait SymbolGraphStore: Send + Sync {
    /// Replace all edges recorded for one file
    async fn replace_file(
        &self,
        namespace: &str,
        file_path: &str,
        edges: Vec<SymbolEdge>,
    ) -> anyhow::Result<()>;
}
