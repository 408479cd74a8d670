use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Legacy head-only rerank weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankConfig {
    pub top_n: usize,
    pub score_weight: f64,
    pub span_weight: f64,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            top_n: 8,
            score_weight: 0.8,
            span_weight: 0.2,
        }
    }
}

/// Weights for the combined base score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreConfig {
    pub weight: f64,
    pub span_weight: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            weight: 0.75,
            span_weight: 0.25,
        }
    }
}

/// Path-prefix allow/deny rules with a penalty multiplier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathPenaltyConfig {
    pub allow_prefixes: Vec<String>,
    pub deny_prefixes: Vec<String>,
    pub penalty_multiplier: f64,
}

impl PathPenaltyConfig {
    pub fn with_defaults() -> Self {
        Self {
            allow_prefixes: Vec::new(),
            deny_prefixes: Vec::new(),
            penalty_multiplier: 0.6,
        }
    }
}

/// Per-file and per-symbol diversity caps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiversityConfig {
    pub max_per_file: usize,
    pub max_per_symbol: usize,
}

impl Default for DiversityConfig {
    fn default() -> Self {
        Self {
            max_per_file: 3,
            max_per_symbol: 2,
        }
    }
}

/// Configuration for the code-aware re-score stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeAwareConfig {
    pub enabled: bool,
    pub default_head_multiplier: f64,
    pub max_head_multiplier: f64,
    pub language_bonus: HashMap<String, f64>,
    pub symbol_priority: HashMap<String, f64>,
    pub path_penalty: PathPenaltyConfig,
    pub diversity: DiversityConfig,
    pub score: ScoreConfig,
}

impl Default for CodeAwareConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_head_multiplier: 2.0,
            max_head_multiplier: 4.0,
            language_bonus: HashMap::new(),
            symbol_priority: HashMap::new(),
            path_penalty: PathPenaltyConfig::with_defaults(),
            diversity: DiversityConfig::default(),
            score: ScoreConfig::default(),
        }
    }
}

/// Neighbor-expansion strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NeighborStrategy {
    Off,
    Linear,
    ParentSymbol,
    CallGraph,
}

/// Configuration for neighbor expansion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborConfig {
    pub strategy: NeighborStrategy,
    pub radius: usize,
    pub limit: usize,
    pub max_radius: usize,
    pub max_limit: usize,
}

impl Default for NeighborConfig {
    fn default() -> Self {
        Self {
            strategy: NeighborStrategy::Linear,
            radius: 1,
            limit: 6,
            max_radius: 5,
            max_limit: 12,
        }
    }
}

impl NeighborConfig {
    /// Radius clamped to the configured maximum
    pub fn effective_radius(&self) -> usize {
        self.radius.min(self.max_radius)
    }

    /// Limit clamped to the configured maximum
    pub fn effective_limit(&self) -> usize {
        self.limit.min(self.max_limit)
    }
}

/// Token budget for the assembled context window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    pub max_context_tokens: i64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_context_tokens: 4000,
        }
    }
}

/// Configuration for LLM snippet compression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub max_snippet_lines: usize,
    pub locale: String,
    pub max_compressed_documents: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_snippet_lines: 8,
            locale: "en".to_string(),
            max_compressed_documents: 3,
        }
    }
}
