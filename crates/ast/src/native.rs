//! Tree-sitter backed symbol extraction.
//!
//! Grammars are linked statically and materialized lazily through
//! [`GrammarRegistry`]; a language without a linked grammar is simply not
//! natively supported. Parse failures surface as [`AstError`] so the caller
//! can count them against the health tracker.

use crate::error::{AstError, Result};
use crate::heuristic::{build_fqn, infer_visibility, is_test_symbol};
use crate::metadata::{AstFileContext, AstSymbolMetadata};
use std::collections::HashMap;
use std::sync::Mutex;
use tree_sitter::{Language, Node, Parser};

const CONTAINER_TYPES: &[&str] = &[
    "class_declaration",
    "class_definition",
    "interface_declaration",
    "enum_declaration",
    "struct_item",
    "enum_item",
    "trait_item",
    "impl_item",
    "mod_item",
    "object_declaration",
    "internal_module",
    "module",
];

const FUNCTION_TYPES: &[&str] = &[
    "function_item",
    "function_definition",
    "function_declaration",
    "method_definition",
    "method_declaration",
    "generator_function_declaration",
    "constructor_declaration",
];

const CALL_TYPES: &[&str] = &["call_expression", "call", "method_invocation", "function_call"];

const IMPORT_TYPES: &[&str] = &[
    "import_declaration",
    "import_statement",
    "import_from_statement",
    "use_declaration",
    "import_header",
];

const PACKAGE_TYPES: &[&str] = &["package_declaration", "package_clause", "package_header"];

/// Contract for the native parsing path.
///
/// Implementations must be cheap to call repeatedly; the extractor decides
/// when the path is eligible and handles every failure.
pub trait NativeParser: Send + Sync {
    fn supports(&self, language: &str) -> bool;
    fn parse(&self, content: &str, language: &str, relative_path: &str) -> Result<AstFileContext>;
}

/// Lazily-populated mapping of language id to grammar handle
#[derive(Default)]
pub struct GrammarRegistry {
    cache: Mutex<HashMap<&'static str, Language>>,
}

impl GrammarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical grammar id for a language tag, if one is linked in
    pub fn canonical_id(language: &str) -> Option<&'static str> {
        match language.to_lowercase().as_str() {
            "rust" | "rs" => Some("rust"),
            "python" | "py" => Some("python"),
            "javascript" | "js" => Some("javascript"),
            "typescript" | "ts" => Some("typescript"),
            _ => None,
        }
    }

    pub fn grammar(&self, language: &str) -> Result<Language> {
        let id = Self::canonical_id(language)
            .ok_or_else(|| AstError::Grammar(language.to_string()))?;
        let mut cache = self.cache.lock().expect("grammar cache poisoned");
        if let Some(grammar) = cache.get(id) {
            return Ok(grammar.clone());
        }
        let grammar: Language = match id {
            "rust" => tree_sitter_rust::LANGUAGE.into(),
            "python" => tree_sitter_python::LANGUAGE.into(),
            "javascript" => tree_sitter_javascript::LANGUAGE.into(),
            "typescript" => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            _ => return Err(AstError::Grammar(language.to_string())),
        };
        cache.insert(id, grammar.clone());
        Ok(grammar)
    }
}

/// Native parser walking the Tree-sitter syntax tree
#[derive(Default)]
pub struct TreeSitterNative {
    registry: GrammarRegistry,
}

impl TreeSitterNative {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NativeParser for TreeSitterNative {
    fn supports(&self, language: &str) -> bool {
        GrammarRegistry::canonical_id(language).is_some()
    }

    fn parse(&self, content: &str, language: &str, relative_path: &str) -> Result<AstFileContext> {
        let grammar = self.registry.grammar(language)?;
        let mut parser = Parser::new();
        parser
            .set_language(&grammar)
            .map_err(|err| AstError::Grammar(err.to_string()))?;
        let tree = parser
            .parse(content, None)
            .ok_or_else(|| AstError::Parse("parser produced no tree".to_string()))?;
        let mut collector = Collector::new(content, relative_path);
        collector.walk(tree.root_node());
        Ok(collector.finish())
    }
}

struct Draft {
    fqn: String,
    kind: String,
    signature: String,
    is_container: bool,
    line_start: usize,
    line_end: usize,
    calls_out: Vec<String>,
}

struct Collector<'a> {
    source: &'a str,
    relative_path: &'a str,
    package: Option<String>,
    imports: Vec<String>,
    stack: Vec<Draft>,
    emitted: Vec<Draft>,
}

impl<'a> Collector<'a> {
    fn new(source: &'a str, relative_path: &'a str) -> Self {
        Self {
            source,
            relative_path,
            package: None,
            imports: Vec::new(),
            stack: Vec::new(),
            emitted: Vec::new(),
        }
    }

    fn walk(&mut self, node: Node<'_>) {
        let node_type = node.kind();
        if PACKAGE_TYPES.contains(&node_type) {
            self.package = Some(extract_package(&self.node_text(node)));
        } else if IMPORT_TYPES.contains(&node_type) {
            self.imports.push(first_line(&self.node_text(node)));
        }

        let mut pushed = false;
        if CONTAINER_TYPES.contains(&node_type) {
            pushed = self.enter(node, node_type, true);
        } else if FUNCTION_TYPES.contains(&node_type) {
            pushed = self.enter(node, node_type, false);
        }

        if CALL_TYPES.contains(&node_type) {
            if let Some(target) = self.extract_call(node) {
                if let Some(active) = self.stack.last_mut() {
                    if !active.calls_out.contains(&target) {
                        active.calls_out.push(target);
                    }
                }
            }
        }

        for index in 0..node.child_count() {
            if let Some(child) = node.child(index) {
                self.walk(child);
            }
        }

        if pushed {
            let draft = self.stack.pop().expect("symbol stack underflow");
            self.emitted.push(draft);
        }
    }

    fn enter(&mut self, node: Node<'_>, node_type: &str, is_container: bool) -> bool {
        let Some(name) = self.extract_name(node) else {
            return false;
        };
        let signature = first_line(&self.node_text(node));
        let fqn = build_fqn(
            self.package.as_deref(),
            self.container_fqn().as_deref(),
            &name,
            is_container,
            &signature,
        );
        self.stack.push(Draft {
            fqn,
            kind: map_kind(node_type).to_string(),
            signature,
            is_container,
            line_start: node.start_position().row + 1,
            line_end: (node.end_position().row + 1).max(node.start_position().row + 1),
            calls_out: Vec::new(),
        });
        true
    }

    fn container_fqn(&self) -> Option<String> {
        self.stack
            .iter()
            .rev()
            .find(|draft| draft.is_container)
            .map(|draft| draft.fqn.clone())
    }

    fn extract_name(&self, node: Node<'_>) -> Option<String> {
        for field in ["name", "type"] {
            if let Some(named) = node.child_by_field_name(field) {
                let text = self.node_text(named);
                if !text.trim().is_empty() {
                    return Some(text.trim().to_string());
                }
            }
        }
        self.first_identifier(node)
            .map(|text| text.trim().to_string())
    }

    fn first_identifier(&self, node: Node<'_>) -> Option<String> {
        if matches!(node.kind(), "identifier" | "type_identifier") {
            return Some(self.node_text(node));
        }
        for index in 0..node.child_count() {
            if let Some(child) = node.child(index) {
                if let Some(found) = self.first_identifier(child) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn extract_call(&self, node: Node<'_>) -> Option<String> {
        let callee = node
            .child_by_field_name("function")
            .map(|target| self.node_text(target))?;
        let callee = callee.trim();
        if callee.is_empty() {
            return None;
        }
        let last = callee
            .rsplit(['.', ':'])
            .next()
            .unwrap_or(callee)
            .trim()
            .to_string();
        if last.is_empty() || !last.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_') {
            return None;
        }
        Some(last)
    }

    fn node_text(&self, node: Node<'_>) -> String {
        self.source
            .get(node.start_byte()..node.end_byte())
            .unwrap_or_default()
            .to_string()
    }

    fn finish(self) -> AstFileContext {
        let total_lines = self.source.split('\n').count().max(1);
        let file_name = if self.relative_path.is_empty() {
            "root".to_string()
        } else {
            self.relative_path.to_string()
        };
        let base = self.relative_path.replace(['/', '\\'], ".");
        let file_fqn = match self.package.as_deref() {
            Some(pkg) if !pkg.is_empty() => format!("{pkg}.{base}"),
            _ => base,
        };
        let mut symbols = Vec::with_capacity(self.emitted.len() + 1);
        symbols.push(AstSymbolMetadata {
            symbol_fqn: file_fqn,
            kind: "file".to_string(),
            visibility: "public".to_string(),
            signature: file_name.clone(),
            docstring: None,
            is_test: is_test_symbol(self.relative_path, &file_name),
            imports: self.imports.clone(),
            calls_out: Vec::new(),
            calls_in: Vec::new(),
            implements_types: Vec::new(),
            line_start: 1,
            line_end: total_lines,
        });
        for draft in self.emitted {
            let name = draft
                .fqn
                .rsplit(['#', '.'])
                .next()
                .unwrap_or(draft.fqn.as_str())
                .to_string();
            symbols.push(AstSymbolMetadata {
                visibility: native_visibility(&draft.signature),
                is_test: is_test_symbol(self.relative_path, &name),
                symbol_fqn: draft.fqn,
                kind: draft.kind,
                signature: draft.signature,
                docstring: None,
                imports: self.imports.clone(),
                calls_out: draft.calls_out,
                calls_in: Vec::new(),
                implements_types: Vec::new(),
                line_start: draft.line_start,
                line_end: draft.line_end,
            });
        }
        AstFileContext::new(symbols)
    }
}

fn native_visibility(signature: &str) -> String {
    let trimmed = signature.trim_start();
    if trimmed.starts_with("pub ") || trimmed.starts_with("pub(") {
        return "public".to_string();
    }
    infer_visibility(signature)
}

fn map_kind(node_type: &str) -> &'static str {
    if node_type.contains("interface") {
        "interface"
    } else if node_type.contains("enum") {
        "enum"
    } else if node_type.contains("trait") {
        "trait"
    } else if node_type.contains("struct") {
        "struct"
    } else if node_type.contains("mod") {
        "module"
    } else if node_type.contains("constructor") {
        "constructor"
    } else if node_type.contains("method") {
        "method"
    } else if node_type.contains("function") {
        "function"
    } else {
        "class"
    }
}

fn extract_package(raw: &str) -> String {
    let trimmed = raw.trim();
    let rest = trimmed.strip_prefix("package").unwrap_or(trimmed).trim();
    rest.strip_suffix(';').unwrap_or(rest).trim().to_string()
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().trim().to_string()
}
