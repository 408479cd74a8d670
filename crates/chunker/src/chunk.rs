use coderag_ast::{AstSymbolMetadata, ParentSymbolResolver};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// An immutable, content-addressed unit of indexed code.
///
/// Identity for downstream storage is `(namespace, hash)`; a hash collision
/// within a namespace means "already indexed, skip".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Trimmed chunk text
    pub text: String,

    /// First line (1-based, inclusive)
    pub line_start: usize,

    /// Last line (1-based, inclusive)
    pub line_end: usize,

    /// Language tag, if known
    pub language: Option<String>,

    /// First two lines of the text, space-joined
    pub summary: String,

    /// SHA-256 of the trimmed text, lowercase hex
    pub hash: String,

    /// Nearest preceding symbol declaration at the chunk start
    pub parent_symbol: Option<String>,

    /// Lines carried over from the previous chunk in the same file
    pub overlap_lines: usize,

    /// Symbol covering this span, when AST data is available
    pub ast_metadata: Option<AstSymbolMetadata>,
}

impl Chunk {
    /// Build a chunk, returning `None` when the trimmed text is empty.
    pub fn from_parts(
        raw_text: &str,
        line_start: usize,
        line_end: usize,
        language: Option<&str>,
        resolver: Option<&ParentSymbolResolver>,
        overlap_lines: usize,
        ast_metadata: Option<AstSymbolMetadata>,
    ) -> Option<Self> {
        let text = raw_text.trim();
        if text.is_empty() {
            return None;
        }
        let parent_symbol =
            resolver.and_then(|resolver| resolver.resolve(line_start).map(str::to_string));
        Some(Self {
            summary: build_summary(text),
            hash: sha256_hex(text),
            text: text.to_string(),
            line_start,
            line_end,
            language: language.map(str::to_string),
            parent_symbol,
            overlap_lines,
            ast_metadata,
        })
    }

    pub fn line_count(&self) -> usize {
        self.line_end.saturating_sub(self.line_start) + 1
    }
}

fn build_summary(text: &str) -> String {
    text.lines()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_produces_no_chunk() {
        assert!(Chunk::from_parts("   \n  ", 1, 2, None, None, 0, None).is_none());
        assert!(Chunk::from_parts("", 1, 1, None, None, 0, None).is_none());
    }

    #[test]
    fn identical_text_hashes_identically() {
        let a = Chunk::from_parts("fn x() {}", 1, 1, Some("rust"), None, 0, None).unwrap();
        let b = Chunk::from_parts("  fn x() {}  ", 10, 10, Some("rust"), None, 5, None).unwrap();
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn different_text_hashes_differently() {
        let a = Chunk::from_parts("fn x() {}", 1, 1, None, None, 0, None).unwrap();
        let b = Chunk::from_parts("fn y() {}", 1, 1, None, None, 0, None).unwrap();
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn summary_takes_first_two_lines() {
        let chunk = Chunk::from_parts("line one\nline two\nline three", 1, 3, None, None, 0, None)
            .unwrap();
        assert_eq!(chunk.summary, "line one line two");
    }

    #[test]
    fn resolves_parent_symbol_at_chunk_start() {
        let lines = vec!["public class Foo {".to_string(), "  int x;".to_string()];
        let resolver = ParentSymbolResolver::new(&lines);
        let chunk =
            Chunk::from_parts("int x;", 2, 2, Some("java"), Some(&resolver), 0, None).unwrap();
        assert_eq!(chunk.parent_symbol.as_deref(), Some("class Foo"));
    }

    #[test]
    fn hash_is_lowercase_hex() {
        let chunk = Chunk::from_parts("abc", 1, 1, None, None, 0, None).unwrap();
        assert_eq!(chunk.hash.len(), 64);
        assert!(chunk.hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
