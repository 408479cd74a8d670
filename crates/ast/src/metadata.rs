use serde::{Deserialize, Serialize};

/// One extracted symbol with its span and lightweight call metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstSymbolMetadata {
    /// Fully qualified name (`pkg.Class`, `pkg.Class#method(args)`)
    pub symbol_fqn: String,

    /// Declaration kind as detected (class, interface, method, fn, file, ...)
    pub kind: String,

    /// public / protected / private / package
    pub visibility: String,

    /// Raw declaration line
    pub signature: String,

    /// Doc comment preceding the declaration, if any
    pub docstring: Option<String>,

    /// Whether the symbol or its file looks like test code
    pub is_test: bool,

    /// File-level import statements
    pub imports: Vec<String>,

    /// Names this symbol calls (insertion-ordered, deduplicated)
    pub calls_out: Vec<String>,

    /// Symbols calling into this one; populated by the graph-build step
    pub calls_in: Vec<String>,

    /// Types named in implements/extends clauses or Python base lists
    pub implements_types: Vec<String>,

    /// First line of the declaration (1-based, inclusive)
    pub line_start: usize,

    /// Last line of the symbol body (1-based, inclusive)
    pub line_end: usize,
}

impl AstSymbolMetadata {
    /// Number of lines covered by this symbol
    pub fn span(&self) -> usize {
        self.line_end.saturating_sub(self.line_start)
    }

    pub fn contains(&self, line: usize) -> bool {
        line >= self.line_start && line <= self.line_end
    }
}

/// Ordered symbol list for one file.
///
/// The first entry is always the file-level fallback symbol, so range lookups
/// have a guaranteed match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstFileContext {
    pub symbols: Vec<AstSymbolMetadata>,
}

impl AstFileContext {
    pub fn new(symbols: Vec<AstSymbolMetadata>) -> Self {
        Self { symbols }
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Best symbol for an inclusive line range.
    ///
    /// Preference order: the smallest symbol whose span fully contains the
    /// range, then the first symbol containing the start line, then the first
    /// symbol overlapping the range, then the file-level fallback.
    pub fn symbol_for_range(&self, start_line: usize, end_line: usize) -> Option<&AstSymbolMetadata> {
        if self.symbols.is_empty() {
            return None;
        }
        let mut perfect: Option<&AstSymbolMetadata> = None;
        let mut start_match: Option<&AstSymbolMetadata> = None;
        let mut overlap: Option<&AstSymbolMetadata> = None;
        for symbol in &self.symbols {
            if symbol.line_start <= start_line && symbol.line_end >= end_line {
                let smaller = perfect.map_or(true, |best| symbol.span() < best.span());
                if smaller {
                    perfect = Some(symbol);
                }
            }
            if start_match.is_none() && symbol.contains(start_line) {
                start_match = Some(symbol);
            }
            if overlap.is_none() && symbol.line_start <= end_line && symbol.line_end >= start_line {
                overlap = Some(symbol);
            }
        }
        perfect
            .or(start_match)
            .or(overlap)
            .or_else(|| self.symbols.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(fqn: &str, kind: &str, start: usize, end: usize) -> AstSymbolMetadata {
        AstSymbolMetadata {
            symbol_fqn: fqn.to_string(),
            kind: kind.to_string(),
            visibility: "public".to_string(),
            signature: fqn.to_string(),
            docstring: None,
            is_test: false,
            imports: Vec::new(),
            calls_out: Vec::new(),
            calls_in: Vec::new(),
            implements_types: Vec::new(),
            line_start: start,
            line_end: end,
        }
    }

    #[test]
    fn smallest_containing_symbol_wins() {
        let context = AstFileContext::new(vec![
            symbol("demo.File", "file", 1, 100),
            symbol("demo.Foo", "class", 5, 60),
            symbol("demo.Foo#bar()", "method", 10, 20),
        ]);
        let found = context.symbol_for_range(12, 18).unwrap();
        assert_eq!(found.symbol_fqn, "demo.Foo#bar()");
    }

    #[test]
    fn falls_back_to_start_line_match() {
        let context = AstFileContext::new(vec![
            symbol("demo.Foo#a()", "method", 5, 10),
            symbol("demo.Foo#b()", "method", 11, 20),
        ]);
        // Range straddles both symbols: nothing fully contains it.
        let found = context.symbol_for_range(8, 15).unwrap();
        assert_eq!(found.symbol_fqn, "demo.Foo#a()");
    }

    #[test]
    fn file_fallback_always_matches() {
        let context = AstFileContext::new(vec![symbol("demo.File", "file", 1, 30)]);
        let found = context.symbol_for_range(500, 600).unwrap();
        assert_eq!(found.kind, "file");
    }

    #[test]
    fn empty_context_yields_none() {
        let context = AstFileContext::default();
        assert!(context.symbol_for_range(1, 2).is_none());
    }
}
