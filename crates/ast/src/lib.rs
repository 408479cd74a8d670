//! # Coderag AST
//!
//! Lightweight symbol extraction for source files.
//!
//! Two extraction paths sit behind one entry point:
//! - a heuristic line scanner that is always available and produces a flat
//!   symbol list with call edges, and
//! - an optional Tree-sitter backed parser that is preferred while healthy.
//!
//! Native parsing is an accelerator, never a requirement: any load or parse
//! failure is counted against a process-wide health tracker and the caller
//! transparently receives heuristic results instead. Once the consecutive
//! failure threshold is reached the native path stays disabled until an
//! explicit reset.

mod config;
mod detect;
mod error;
mod extractor;
mod health;
mod heuristic;
mod metadata;
mod native;

pub use config::AstConfig;
pub use detect::{detect_symbol, ParentSymbolResolver};
pub use error::{AstError, Result};
pub use extractor::AstExtractor;
pub use health::ParserHealth;
pub use heuristic::extract as heuristic_extract;
pub use metadata::{AstFileContext, AstSymbolMetadata};
pub use native::{GrammarRegistry, NativeParser, TreeSitterNative};
