use thiserror::Error;

/// Result type for AST operations
pub type Result<T> = std::result::Result<T, AstError>;

/// Errors raised by the native parsing path.
///
/// The heuristic extractor is infallible; these errors never escape
/// [`crate::AstExtractor::parse`], they only feed the health tracker.
#[derive(Error, Debug)]
pub enum AstError {
    /// Grammar could not be prepared for a language
    #[error("grammar unavailable for {0}")]
    Grammar(String),

    /// Native parse failed
    #[error("native parse failed: {0}")]
    Parse(String),
}
