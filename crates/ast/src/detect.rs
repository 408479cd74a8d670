use once_cell::sync::Lazy;
use regex::Regex;

/// Ordered declaration detectors. First match wins, so container declarations
/// are tried before the looser method/function shapes.
static CLASS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:public\s+|protected\s+|private\s+|abstract\s+|final\s+|sealed\s+)?(class|interface|enum|record|struct|trait)\s+([A-Za-z_][\w$]*)",
    )
    .expect("class pattern")
});

static PY_CLASS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^class\s+([A-Za-z_]\w*)").expect("python class pattern"));

static METHOD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^(?:public\s+|protected\s+|private\s+|static\s+|final\s+|async\s+|override\s+|synchronized\s+)*[\w<>\[\],"'\s]+\s+([A-Za-z_][\w$]*)\s*\([^)]*\)\s*(?:\{|=>|throws|default|;)?$"#,
    )
    .expect("method pattern")
});

static DEF_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:async\s+)?def\s+([A-Za-z_]\w*)\s*\(").expect("def pattern"));

static JS_FUNCTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^function\s+([A-Za-z_$][\w$]*)\s*\(").expect("function pattern"));

static FUNC_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^func\s+([A-Za-z_]\w*)\s*\(").expect("func pattern"));

static FN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^fn\s+([A-Za-z_]\w*)\s*\(").expect("fn pattern"));

static FUN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^fun\s+([A-Za-z_]\w*)\s*\(").expect("fun pattern"));

static ARROW_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*\([^)]*\)\s*=>")
        .expect("arrow pattern")
});

/// Detect a symbol declaration on a single line.
///
/// Returns `"<kind> <name>"` (e.g. `"class Foo"`, `"method bar"`) or `None`.
/// Comment-only lines never match.
pub fn detect_symbol(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with('#') {
        return None;
    }
    if let Some(captures) = CLASS_PATTERN.captures(trimmed) {
        return Some(format!(
            "{} {}",
            captures[1].to_lowercase(),
            &captures[2]
        ));
    }
    if let Some(captures) = PY_CLASS_PATTERN.captures(trimmed) {
        return Some(format!("class {}", &captures[1]));
    }
    if let Some(captures) = METHOD_PATTERN.captures(trimmed) {
        return Some(format!("method {}", &captures[1]));
    }
    if let Some(captures) = DEF_PATTERN.captures(trimmed) {
        return Some(format!("def {}", &captures[1]));
    }
    if let Some(captures) = JS_FUNCTION_PATTERN.captures(trimmed) {
        return Some(format!("function {}", &captures[1]));
    }
    if let Some(captures) = FUNC_PATTERN.captures(trimmed) {
        return Some(format!("func {}", &captures[1]));
    }
    if let Some(captures) = FN_PATTERN.captures(trimmed) {
        return Some(format!("fn {}", &captures[1]));
    }
    if let Some(captures) = FUN_PATTERN.captures(trimmed) {
        return Some(format!("fun {}", &captures[1]));
    }
    if let Some(captures) = ARROW_PATTERN.captures(trimmed) {
        return Some(format!("function {}", &captures[1]));
    }
    None
}

/// Per-line lookup of the nearest preceding symbol declaration.
///
/// Built once per file with a single forward pass; `resolve` walks backward
/// from the requested line until a symbol is found.
#[derive(Debug, Clone)]
pub struct ParentSymbolResolver {
    by_line: Vec<Option<String>>,
}

impl ParentSymbolResolver {
    pub fn new<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut by_line = Vec::with_capacity(lines.len());
        let mut current: Option<String> = None;
        for line in lines {
            if let Some(symbol) = detect_symbol(line.as_ref()) {
                current = Some(symbol);
            }
            by_line.push(current.clone());
        }
        Self { by_line }
    }

    /// Nearest symbol at or before `line_number` (1-based), if any.
    pub fn resolve(&self, line_number: usize) -> Option<&str> {
        if self.by_line.is_empty() || line_number == 0 {
            return None;
        }
        let mut index = line_number.min(self.by_line.len());
        while index >= 1 {
            if let Some(symbol) = self.by_line[index - 1].as_deref() {
                return Some(symbol);
            }
            index -= 1;
        }
        None
    }
}
