use serde::{Deserialize, Serialize};

/// Configuration for the repository indexing pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Prefix for derived namespaces (`<prefix>:<owner>/<repo>`)
    pub namespace_prefix: String,

    /// Maximum number of files chunked concurrently
    pub max_concurrency: usize,

    /// Directory names excluded from the scan
    pub ignore_directories: Vec<String>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            namespace_prefix: "repo".to_string(),
            max_concurrency: 2,
            ignore_directories: vec![
                ".git".to_string(),
                ".github".to_string(),
                "node_modules".to_string(),
                "dist".to_string(),
                "build".to_string(),
            ],
        }
    }
}

impl IndexerConfig {
    /// Namespace for a repository slug
    pub fn namespace_for(&self, repository: &str) -> String {
        format!("{}:{}", self.namespace_prefix, repository)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_uses_prefix() {
        let config = IndexerConfig::default();
        assert_eq!(config.namespace_for("acme/billing"), "repo:acme/billing");
    }

    #[test]
    fn default_ignores_vcs_and_build_dirs() {
        let config = IndexerConfig::default();
        assert!(config.ignore_directories.iter().any(|d| d == ".git"));
        assert!(config.ignore_directories.iter().any(|d| d == "node_modules"));
        assert_eq!(config.max_concurrency, 2);
    }
}
