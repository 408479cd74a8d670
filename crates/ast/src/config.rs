use serde::{Deserialize, Serialize};

/// Configuration for symbol extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstConfig {
    /// Whether the native parsing path may be used at all
    pub enabled: bool,

    /// Languages eligible for native parsing (lowercase ids)
    pub languages: Vec<String>,

    /// Consecutive native failures before the path is permanently degraded
    pub failure_threshold: u32,
}

impl Default for AstConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            languages: vec![
                "java".to_string(),
                "kotlin".to_string(),
                "typescript".to_string(),
                "javascript".to_string(),
                "python".to_string(),
                "go".to_string(),
                "rust".to_string(),
            ],
            failure_threshold: 3,
        }
    }
}

impl AstConfig {
    /// Check whether a language id is in the configured allow list
    pub fn supports_language(&self, language: &str) -> bool {
        self.languages
            .iter()
            .any(|entry| entry.eq_ignore_ascii_case(language))
    }
}
