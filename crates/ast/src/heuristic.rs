//! Heuristic, line-oriented symbol extraction.
//!
//! Always available and intentionally approximate: declarations are found
//! with the same detectors as [`crate::detect_symbol`], bodies are assumed to
//! run until the next declaration, and call edges are plain `identifier(`
//! occurrences minus control-flow keywords.

use crate::detect::detect_symbol;
use crate::metadata::{AstFileContext, AstSymbolMetadata};
use once_cell::sync::Lazy;
use regex::Regex;

static CALL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Za-z_][\w$]*)\s*\(").expect("call pattern"));

static DOC_MARKER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(?:/\*\*?|//|#|\*|"""|''')\s*"#).expect("doc marker pattern"));

static IMPLEMENTS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bimplements\s+([A-Za-z_][\w$.,\s<>]*)").expect("implements pattern"));

static EXTENDS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bextends\s+([A-Za-z_][\w$.,\s<>]*)").expect("extends pattern"));

static PY_CLASS_BASE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^class\s+[A-Za-z_]\w*\s*\(([^)]*)\)").expect("py base pattern"));

const CALL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "throw", "new", "else", "case", "class",
    "def", "function", "fun", "fn", "match",
];

const CONTAINER_KINDS: &[&str] = &["class", "interface", "enum", "record", "trait", "struct"];

#[derive(Default)]
struct SymbolDraft {
    name: String,
    kind: String,
    visibility: String,
    signature: String,
    docstring: Option<String>,
    is_test: bool,
    line_start: usize,
    line_end: usize,
    calls_out: Vec<String>,
    implements_types: Vec<String>,
    symbol_fqn: String,
    parent_fqn: Option<String>,
}

/// Extract symbols from file content with a single forward scan.
///
/// Always returns a usable context: when no declarations are found the result
/// holds only the file-level fallback symbol spanning the whole file.
pub fn extract(content: &str, language: &str, relative_path: &str) -> AstFileContext {
    let normalized_language = language.to_lowercase();
    let lines: Vec<&str> = content.split('\n').collect();
    let package = detect_package(&lines);
    let imports = collect_imports(&lines);

    let mut doc_buffer: Vec<String> = Vec::new();
    let mut drafts: Vec<SymbolDraft> = Vec::new();
    let mut active: Option<usize> = None;
    let mut container_fqn: Option<String> = None;

    for (index, raw_line) in lines.iter().enumerate() {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            doc_buffer.clear();
            continue;
        }
        if is_doc_line(trimmed, &normalized_language) {
            doc_buffer.push(clean_doc_line(trimmed));
            continue;
        }
        if let Some(symbol_text) = detect_symbol(raw_line) {
            let kind = extract_kind(&symbol_text);
            let name = extract_name(&symbol_text);
            let is_container = CONTAINER_KINDS.contains(&kind.as_str());
            let fqn = build_fqn(
                package.as_deref(),
                container_fqn.as_deref(),
                &name,
                is_container,
                trimmed,
            );
            let mut draft = SymbolDraft {
                is_test: is_test_symbol(relative_path, &name),
                visibility: infer_visibility(raw_line),
                docstring: join_doc(&doc_buffer),
                signature: trimmed.to_string(),
                line_start: index + 1,
                parent_fqn: container_fqn.clone(),
                symbol_fqn: fqn,
                kind,
                name,
                ..SymbolDraft::default()
            };
            if is_container {
                draft.implements_types = detect_inheritance(trimmed, &normalized_language);
                container_fqn = Some(draft.symbol_fqn.clone());
            }
            drafts.push(draft);
            active = Some(drafts.len() - 1);
            doc_buffer.clear();
            continue;
        }
        if let Some(active_index) = active {
            for captures in CALL_PATTERN.captures_iter(trimmed) {
                let mut candidate = captures[1].to_string();
                if CALL_KEYWORDS.contains(&candidate.as_str()) {
                    continue;
                }
                if let Some(dot) = candidate.rfind('.') {
                    candidate = candidate[dot + 1..].to_string();
                }
                let calls = &mut drafts[active_index].calls_out;
                if !calls.contains(&candidate) {
                    calls.push(candidate);
                }
            }
        }
    }

    let total_lines = lines.len().max(1);
    let count = drafts.len();
    for index in 0..count {
        let end = if index + 1 < count {
            drafts[index + 1].line_start.saturating_sub(1)
        } else {
            total_lines
        };
        drafts[index].line_end = end.max(drafts[index].line_start);
    }

    // Containers aggregate the calls of their members.
    for index in 0..count {
        let Some(parent_fqn) = drafts[index].parent_fqn.clone() else {
            continue;
        };
        let calls = drafts[index].calls_out.clone();
        if let Some(parent) = drafts.iter_mut().find(|d| d.symbol_fqn == parent_fqn) {
            for call in calls {
                if !parent.calls_out.contains(&call) {
                    parent.calls_out.push(call);
                }
            }
        }
    }

    let mut symbols = Vec::with_capacity(count + 1);
    symbols.push(file_symbol(
        relative_path,
        package.as_deref(),
        total_lines,
        &imports,
    ));
    for draft in drafts {
        symbols.push(AstSymbolMetadata {
            symbol_fqn: draft.symbol_fqn,
            kind: draft.kind,
            visibility: draft.visibility,
            signature: draft.signature,
            docstring: draft.docstring,
            is_test: draft.is_test,
            imports: imports.clone(),
            calls_out: draft.calls_out,
            calls_in: Vec::new(),
            implements_types: draft.implements_types,
            line_start: draft.line_start,
            line_end: draft.line_end,
        });
    }
    AstFileContext::new(symbols)
}

fn file_symbol(
    relative_path: &str,
    package: Option<&str>,
    total_lines: usize,
    imports: &[String],
) -> AstSymbolMetadata {
    let name = if relative_path.is_empty() {
        "root".to_string()
    } else {
        relative_path.to_string()
    };
    let base = sanitize_path(relative_path);
    let fqn = match package {
        Some(pkg) if !pkg.is_empty() => format!("{pkg}.{base}"),
        _ => base,
    };
    AstSymbolMetadata {
        symbol_fqn: fqn,
        kind: "file".to_string(),
        visibility: "public".to_string(),
        signature: name.clone(),
        docstring: None,
        is_test: is_test_symbol(relative_path, &name),
        imports: imports.to_vec(),
        calls_out: Vec::new(),
        calls_in: Vec::new(),
        implements_types: Vec::new(),
        line_start: 1,
        line_end: total_lines.max(1),
    }
}

fn detect_package(lines: &[&str]) -> Option<String> {
    for line in lines {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("package ") {
            let package = rest.replace(';', "");
            let package = package.trim();
            if !package.is_empty() {
                return Some(package.to_string());
            }
        }
    }
    None
}

fn collect_imports(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| line.starts_with("import ") || line.starts_with("from "))
        .map(str::to_string)
        .collect()
}

fn is_doc_line(trimmed: &str, language: &str) -> bool {
    trimmed.starts_with("/**")
        || trimmed.starts_with("/*")
        || trimmed.starts_with("//")
        || (language.starts_with("py") && trimmed.starts_with('#'))
        || trimmed.starts_with("\"\"\"")
        || trimmed.starts_with("'''")
}

fn clean_doc_line(trimmed: &str) -> String {
    let mut sanitized = DOC_MARKER_PATTERN.replace(trimmed, "").into_owned();
    for suffix in ["*/", "\"\"\"", "'''"] {
        if let Some(stripped) = sanitized.strip_suffix(suffix) {
            sanitized = stripped.to_string();
        }
    }
    sanitized.trim().to_string()
}

fn join_doc(doc_buffer: &[String]) -> Option<String> {
    if doc_buffer.is_empty() {
        return None;
    }
    let doc = doc_buffer.join("\n").trim().to_string();
    if doc.is_empty() {
        None
    } else {
        Some(doc)
    }
}

fn extract_kind(symbol_text: &str) -> String {
    match symbol_text.split_once(' ') {
        Some((kind, _)) => kind.to_lowercase(),
        None => symbol_text.to_lowercase(),
    }
}

fn extract_name(symbol_text: &str) -> String {
    match symbol_text.split_once(' ') {
        Some((_, name)) => name.trim().to_string(),
        None => symbol_text.trim().to_string(),
    }
}

pub(crate) fn infer_visibility(line: &str) -> String {
    let lower = line.to_lowercase();
    if lower.contains("public") {
        "public".to_string()
    } else if lower.contains("protected") {
        "protected".to_string()
    } else if lower.contains("private") {
        "private".to_string()
    } else {
        "package".to_string()
    }
}

pub(crate) fn is_test_symbol(relative_path: &str, name: &str) -> bool {
    let lower_name = name.to_lowercase();
    let lower_path = relative_path.to_lowercase();
    lower_name.contains("test") || lower_path.contains("/test") || lower_path.contains("\\test")
}

fn sanitize_path(relative_path: &str) -> String {
    relative_path.replace(['/', '\\'], ".")
}

pub(crate) fn build_fqn(
    package: Option<&str>,
    container_fqn: Option<&str>,
    symbol_name: &str,
    is_container: bool,
    signature: &str,
) -> String {
    let base = container_fqn.or(package).filter(|b| !b.is_empty());
    let mut name = symbol_name.trim().to_string();
    if !is_container {
        let args = extract_args(signature);
        name.push_str(&args);
        name.retain(|c| c != ' ');
    }
    match base {
        Some(base) if is_container => format!("{base}.{name}"),
        Some(base) => format!("{base}#{name}"),
        None => name,
    }
}

fn extract_args(signature: &str) -> String {
    if let (Some(open), Some(close)) = (signature.find('('), signature.find(')')) {
        if close > open {
            return signature[open..=close].to_string();
        }
    }
    "()".to_string()
}

fn detect_inheritance(line: &str, language: &str) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    let mut push_types = |raw: &str| {
        for entry in raw.split(',') {
            let entry = entry.trim();
            if !entry.is_empty() && !result.iter().any(|existing| existing == entry) {
                result.push(entry.to_string());
            }
        }
    };
    if let Some(captures) = IMPLEMENTS_PATTERN.captures(line) {
        push_types(&captures[1]);
    }
    if let Some(captures) = EXTENDS_PATTERN.captures(line) {
        push_types(&captures[1]);
    }
    if language.starts_with("python") {
        if let Some(captures) = PY_CLASS_BASE_PATTERN.captures(line) {
            push_types(&captures[1]);
        }
    }
    result
}
