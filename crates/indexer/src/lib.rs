//! # Coderag Indexer
//!
//! Repository indexing pass: scans a checkout, chunks every eligible file,
//! maps chunks to retrieval documents and keeps the namespace symbol graph in
//! sync.
//!
//! Files are processed with bounded parallelism — chunking is stateless per
//! file, so only the shared seen-hash set and the store adapters need
//! synchronization. A cooperative cancellation flag is checked between files;
//! no partial chunk ever reaches a store because chunk construction is pure.

mod config;
mod error;
mod graph;
mod indexer;
mod mapper;
mod scanner;
mod stats;
mod store;

pub use config::IndexerConfig;
pub use error::{IndexerError, Result};
pub use graph::{NamespaceSymbolGraph, SymbolGraphBuilder};
pub use indexer::RepoIndexer;
pub use mapper::{document_id, to_document};
pub use scanner::{read_utf8, RepoScanner};
pub use stats::IndexStats;
pub use store::{EmbeddingStore, SymbolGraphStore};
