use crate::error::{ChunkerError, Result};
use serde::{Deserialize, Serialize};

/// Chunking strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Strategy {
    /// Fixed line count with a byte budget
    Line,
    /// Byte budget only (line cap removed)
    Byte,
    /// Sliding BPE token window
    Token,
    /// Symbol-boundary aware, falls back to LINE
    Semantic,
}

/// Limits for the LINE strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineLimits {
    pub max_lines: usize,
    pub max_bytes: usize,
}

impl Default for LineLimits {
    fn default() -> Self {
        Self {
            max_lines: 160,
            max_bytes: 2048,
        }
    }
}

/// Limits for the BYTE strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ByteLimits {
    pub max_bytes: usize,
}

impl Default for ByteLimits {
    fn default() -> Self {
        Self { max_bytes: 4096 }
    }
}

/// Limits for the TOKEN strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLimits {
    pub chunk_size_tokens: usize,
    pub min_chunk_chars: usize,
    pub min_chunk_length_to_embed: usize,
    pub max_num_chunks: usize,
}

impl Default for TokenLimits {
    fn default() -> Self {
        Self {
            chunk_size_tokens: 800,
            min_chunk_chars: 200,
            min_chunk_length_to_embed: 40,
            max_num_chunks: 10_000,
        }
    }
}

/// Limits for the SEMANTIC strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticLimits {
    pub enabled: bool,
    pub chunk_size_tokens: usize,
}

impl Default for SemanticLimits {
    fn default() -> Self {
        Self {
            enabled: false,
            chunk_size_tokens: 1024,
        }
    }
}

/// Configuration for all chunking strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub strategy: Strategy,

    /// Lines carried from one chunk into the next (LINE/BYTE/SEMANTIC)
    pub overlap_lines: usize,

    /// Token overlap between consecutive windows (TOKEN)
    pub overlap_tokens: usize,

    pub line: LineLimits,
    pub byte: ByteLimits,
    pub token: TokenLimits,
    pub semantic: SemanticLimits,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Line,
            overlap_lines: 20,
            overlap_tokens: 120,
            line: LineLimits::default(),
            byte: ByteLimits::default(),
            token: TokenLimits::default(),
            semantic: SemanticLimits::default(),
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.line.max_lines == 0 {
            return Err(ChunkerError::invalid_config("line.max_lines must be > 0"));
        }
        if self.line.max_bytes == 0 || self.byte.max_bytes == 0 {
            return Err(ChunkerError::invalid_config("byte budgets must be > 0"));
        }
        if self.token.chunk_size_tokens == 0 {
            return Err(ChunkerError::invalid_config(
                "token.chunk_size_tokens must be > 0",
            ));
        }
        if self.semantic.chunk_size_tokens == 0 {
            return Err(ChunkerError::invalid_config(
                "semantic.chunk_size_tokens must be > 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ChunkingConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_limits_are_rejected() {
        let mut config = ChunkingConfig::default();
        config.line.max_lines = 0;
        assert!(config.validate().is_err());

        let mut config = ChunkingConfig::default();
        config.token.chunk_size_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn strategy_serializes_to_uppercase() {
        let json = serde_json::to_string(&Strategy::Semantic).unwrap();
        assert_eq!(json, "\"SEMANTIC\"");
    }
}
