//! # Coderag Chunker
//!
//! Splits normalized source files into content-addressed chunks.
//!
//! ## Architecture
//!
//! ```text
//! Raw file content
//!     │
//!     ├──> ChunkableFile (newline normalization, line index,
//!     │                   parent-symbol resolver, lazy AST context)
//!     │
//!     ├──> Strategy dispatch (LINE / BYTE / TOKEN / SEMANTIC)
//!     │
//!     └──> Chunk[] (trimmed text, SHA-256 hash, line span,
//!                   parent symbol, overlap, AST metadata)
//! ```
//!
//! Every strategy is deterministic: identical content and configuration
//! always produce identical chunk boundaries and hashes. Empty files produce
//! empty chunk lists, and a chunk with empty normalized text is never
//! emitted.

mod chunk;
mod config;
mod error;
mod file;
mod language;
mod line;
mod line_index;
mod semantic;
mod strategy;
mod token;

pub use chunk::Chunk;
pub use config::{
    ByteLimits, ChunkingConfig, LineLimits, SemanticLimits, Strategy, TokenLimits,
};
pub use error::{ChunkerError, Result};
pub use file::{AstSupplier, ChunkableFile};
pub use language::detect_language;
pub use line::LineChunking;
pub use line_index::LineIndex;
pub use semantic::SemanticChunking;
pub use strategy::{Chunker, ChunkingContext, ChunkingStrategy};
pub use token::TokenChunking;
