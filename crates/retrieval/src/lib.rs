//! # Coderag Retrieval
//!
//! Post-processing chain for ranked retrieval results.
//!
//! Stages share one contract ([`DocumentPostProcessor`]) and compose in a
//! fixed order:
//!
//! ```text
//! ranked results
//!     │
//!     ├──> code-aware re-score   (head window only)
//!     ├──> neighbor expansion    (LINEAR / PARENT_SYMBOL / CALL_GRAPH)
//!     ├──> token-budget truncation
//!     └──> snippet compression   (optional, LLM-backed)
//! ```
//!
//! No stage re-queries the vector index; neighbor expansion borrows
//! previously-indexed chunks through the [`ChunkLookup`] collaborator and the
//! compression stage degrades to the original document on any model failure.

mod budget;
mod compress;
mod config;
mod document;
mod neighbor;
mod pipeline;
mod rescore;
mod traits;

pub use budget::ContextWindowBudget;
pub use compress::SnippetCompressor;
pub use config::{
    BudgetConfig, CodeAwareConfig, CompressionConfig, DiversityConfig, NeighborConfig,
    NeighborStrategy, PathPenaltyConfig, RerankConfig, ScoreConfig,
};
pub use document::{keys, Document, Query};
pub use neighbor::NeighborExpander;
pub use pipeline::{DocumentPostProcessor, PostProcessingPipeline};
pub use rescore::{CodeAwareRescorer, HeuristicRescorer};
pub use traits::{ChunkLookup, LanguageModelClient, SymbolEdge, SymbolGraph};
