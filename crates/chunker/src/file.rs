use crate::line_index::LineIndex;
use coderag_ast::{AstFileContext, ParentSymbolResolver};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Deferred AST computation; invoked at most once per file
pub type AstSupplier = Box<dyn Fn() -> Option<AstFileContext> + Send + Sync>;

/// A normalized source file prepared for chunking.
///
/// Construction is eager for the cheap parts (newline normalization, line
/// list, line index, parent-symbol resolver) and lazy for the AST context,
/// which is computed at most once per file regardless of how many strategies
/// or chunks consult it.
pub struct ChunkableFile {
    absolute_path: PathBuf,
    relative_path: String,
    language: Option<String>,
    content: String,
    lines: Vec<String>,
    line_index: LineIndex,
    resolver: ParentSymbolResolver,
    ast_supplier: AstSupplier,
    ast: OnceLock<Option<AstFileContext>>,
}

impl ChunkableFile {
    pub fn new(
        absolute_path: impl Into<PathBuf>,
        relative_path: impl Into<String>,
        language: Option<String>,
        raw_content: &str,
        ast_supplier: AstSupplier,
    ) -> Self {
        let content = normalize(raw_content);
        let lines = split_lines(&content);
        let line_index = LineIndex::new(&lines);
        let resolver = ParentSymbolResolver::new(&lines);
        Self {
            absolute_path: absolute_path.into(),
            relative_path: relative_path.into(),
            language,
            content,
            lines,
            line_index,
            resolver,
            ast_supplier,
            ast: OnceLock::new(),
        }
    }

    /// Construct without an AST supplier (`ast_context` stays absent)
    pub fn without_ast(
        absolute_path: impl Into<PathBuf>,
        relative_path: impl Into<String>,
        language: Option<String>,
        raw_content: &str,
    ) -> Self {
        Self::new(absolute_path, relative_path, language, raw_content, Box::new(|| None))
    }

    pub fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }

    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn parent_symbol_resolver(&self) -> &ParentSymbolResolver {
        &self.resolver
    }

    /// Lazily-computed AST context; memoized including the absent outcome.
    pub fn ast_context(&self) -> Option<&AstFileContext> {
        self.ast.get_or_init(|| (self.ast_supplier)()).as_ref()
    }
}

impl fmt::Debug for ChunkableFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkableFile")
            .field("relative_path", &self.relative_path)
            .field("language", &self.language)
            .field("lines", &self.lines.len())
            .finish()
    }
}

fn normalize(value: &str) -> String {
    value.replace("\r\n", "\n").replace('\r', "\n")
}

fn split_lines(content: &str) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }
    content.split('\n').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn normalizes_line_endings() {
        let file = ChunkableFile::without_ast("/tmp/a.rs", "a.rs", None, "a\r\nb\rc\n");
        assert_eq!(file.content(), "a\nb\nc\n");
        assert_eq!(file.lines(), &["a", "b", "c", ""]);
    }

    #[test]
    fn empty_content_has_no_lines() {
        let file = ChunkableFile::without_ast("/tmp/a.rs", "a.rs", None, "");
        assert!(file.lines().is_empty());
    }

    #[test]
    fn ast_supplier_runs_at_most_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let file = ChunkableFile::new(
            "/tmp/a.rs",
            "a.rs",
            Some("rust".to_string()),
            "fn a() {}\n",
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                None
            }),
        );
        assert!(file.ast_context().is_none());
        assert!(file.ast_context().is_none());
        assert!(file.ast_context().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn ast_context_is_shared_across_calls() {
        let context = AstFileContext::default();
        let file = ChunkableFile::new(
            "/tmp/a.rs",
            "a.rs",
            Some("rust".to_string()),
            "fn a() {}\n",
            Box::new(move || Some(context.clone())),
        );
        let first = file.ast_context().unwrap() as *const AstFileContext;
        let second = file.ast_context().unwrap() as *const AstFileContext;
        assert_eq!(first, second);
    }
}
