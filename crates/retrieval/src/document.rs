use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known metadata keys carried by indexed documents
pub mod keys {
    pub const NAMESPACE: &str = "namespace";
    pub const FILE_PATH: &str = "file_path";
    pub const CHUNK_INDEX: &str = "chunk_index";
    pub const CHUNK_HASH: &str = "chunk_hash";
    pub const LANGUAGE: &str = "language";
    pub const LINE_START: &str = "line_start";
    pub const LINE_END: &str = "line_end";
    pub const SYMBOL_FQN: &str = "symbol_fqn";
    pub const SYMBOL_KIND: &str = "symbol_kind";
    pub const SYMBOL_VISIBILITY: &str = "symbol_visibility";
    pub const PARENT_SYMBOL: &str = "parent_symbol";

    // Enrichment keys added by neighbor expansion
    pub const NEIGHBOR_RELATION: &str = "neighbor_relation";
    pub const NEIGHBOR_SYMBOL: &str = "neighbor_symbol";
    pub const NEIGHBOR_REFERENCED_SYMBOL: &str = "neighbor_referenced_symbol";
    pub const NEIGHBOR_OF_SPAN_HASH: &str = "neighbor_of_span_hash";
}

/// The user question driving retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One ranked retrieval result.
///
/// Produced by the vector store, consumed and enriched by the
/// post-processing chain; the chain never re-embeds or re-queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    /// Similarity score in `[0, 1]`, absent when the store did not report one
    pub score: Option<f64>,
    pub metadata: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>, score: Option<f64>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            score,
            metadata: Map::new(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Lowercased, trimmed string metadata value
    pub fn metadata_lower(&self, key: &str) -> Option<String> {
        self.metadata_str(key)
            .map(|value| value.trim().to_lowercase())
    }

    /// Integer metadata value, tolerating string-encoded numbers
    pub fn metadata_i64(&self, key: &str) -> Option<i64> {
        match self.metadata.get(key)? {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn chunk_hash(&self) -> Option<&str> {
        self.metadata_str(keys::CHUNK_HASH)
    }

    /// Inclusive line span length, defaulting when metadata is missing
    pub fn line_span(&self, default: f64) -> f64 {
        if self.metadata.is_empty() {
            return default;
        }
        let start = self.metadata_i64(keys::LINE_START).unwrap_or(1);
        let end = self.metadata_i64(keys::LINE_END).unwrap_or(start);
        (end - start + 1).max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_metadata_rejects_blank_values() {
        let doc = Document::new("1", "text", None)
            .with_metadata("a", "value")
            .with_metadata("b", "   ");
        assert_eq!(doc.metadata_str("a"), Some("value"));
        assert_eq!(doc.metadata_str("b"), None);
        assert_eq!(doc.metadata_str("missing"), None);
    }

    #[test]
    fn numeric_metadata_parses_strings() {
        let doc = Document::new("1", "text", None)
            .with_metadata(keys::CHUNK_INDEX, 4)
            .with_metadata(keys::LINE_START, " 12 ");
        assert_eq!(doc.metadata_i64(keys::CHUNK_INDEX), Some(4));
        assert_eq!(doc.metadata_i64(keys::LINE_START), Some(12));
    }

    #[test]
    fn line_span_defaults_without_metadata() {
        let doc = Document::new("1", "text", None);
        assert_eq!(doc.line_span(40.0), 40.0);
        let doc = doc
            .with_metadata(keys::LINE_START, 10)
            .with_metadata(keys::LINE_END, 19);
        assert_eq!(doc.line_span(40.0), 10.0);
    }
}
