//! Namespace symbol-graph construction.
//!
//! Chunk extraction records only outgoing call names; this module inverts
//! them across a namespace so `calls_in` and `CALLED_BY` edges exist for the
//! call-graph neighbor expansion.

use coderag_ast::AstFileContext;
use coderag_chunker::Chunk;
use coderag_retrieval::SymbolEdge;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

pub const RELATION_CALLS: &str = "CALLS";
pub const RELATION_CALLED_BY: &str = "CALLED_BY";

/// Directed symbol graph for one namespace
pub struct NamespaceSymbolGraph {
    graph: DiGraph<String, String>,
    nodes: HashMap<String, NodeIndex>,
}

impl NamespaceSymbolGraph {
    fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            nodes: HashMap::new(),
        }
    }

    fn node(&mut self, fqn: &str) -> NodeIndex {
        if let Some(index) = self.nodes.get(fqn) {
            return *index;
        }
        let index = self.graph.add_node(fqn.to_string());
        self.nodes.insert(fqn.to_string(), index);
        index
    }

    pub fn symbol_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Symbols the given symbol calls
    pub fn callees_of(&self, fqn: &str) -> Vec<&str> {
        let Some(index) = self.nodes.get(fqn) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(*index, petgraph::Direction::Outgoing)
            .map(|neighbor| self.graph[neighbor].as_str())
            .collect()
    }

    /// Symbols calling into the given symbol
    pub fn callers_of(&self, fqn: &str) -> Vec<&str> {
        let Some(index) = self.nodes.get(fqn) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(*index, petgraph::Direction::Incoming)
            .map(|neighbor| self.graph[neighbor].as_str())
            .collect()
    }
}

/// Builds persistable symbol edges and the in-memory namespace graph.
pub struct SymbolGraphBuilder;

impl SymbolGraphBuilder {
    /// `CALLS` edges for one file's chunks.
    ///
    /// A file whose chunks carry AST metadata but no calls still yields a
    /// single self-edge so the namespace records the symbol's presence.
    pub fn edges_for_file(file_path: &str, chunks: &[Chunk]) -> Vec<SymbolEdge> {
        let mut edges = Vec::new();
        let mut has_ast = false;
        for (chunk_index, chunk) in chunks.iter().enumerate() {
            let Some(ast) = &chunk.ast_metadata else {
                continue;
            };
            if ast.symbol_fqn.is_empty() {
                continue;
            }
            has_ast = true;
            for callee in &ast.calls_out {
                edges.push(SymbolEdge {
                    file_path: file_path.to_string(),
                    chunk_index: chunk_index as i64,
                    chunk_hash: chunk.hash.clone(),
                    relation: RELATION_CALLS.to_string(),
                    symbol_fqn: ast.symbol_fqn.clone(),
                    referenced_symbol_fqn: callee.clone(),
                });
            }
        }
        if edges.is_empty() && has_ast {
            if let Some((chunk, ast)) = chunks
                .first()
                .and_then(|chunk| chunk.ast_metadata.as_ref().map(|ast| (chunk, ast)))
            {
                edges.push(SymbolEdge {
                    file_path: file_path.to_string(),
                    chunk_index: 0,
                    chunk_hash: chunk.hash.clone(),
                    relation: RELATION_CALLS.to_string(),
                    symbol_fqn: ast.symbol_fqn.clone(),
                    referenced_symbol_fqn: ast.symbol_fqn.clone(),
                });
            }
        }
        edges
    }

    /// Assemble the namespace graph, resolving call names against the
    /// terminal name segment of every known symbol FQN.
    pub fn assemble(contexts: &[(String, AstFileContext)]) -> NamespaceSymbolGraph {
        let mut graph = NamespaceSymbolGraph::new();
        let mut by_terminal: HashMap<String, Vec<String>> = HashMap::new();
        for (_, context) in contexts {
            for symbol in &context.symbols {
                graph.node(&symbol.symbol_fqn);
                by_terminal
                    .entry(terminal_name(&symbol.symbol_fqn))
                    .or_default()
                    .push(symbol.symbol_fqn.clone());
            }
        }
        for (_, context) in contexts {
            for symbol in &context.symbols {
                for callee in &symbol.calls_out {
                    let Some(targets) = by_terminal.get(callee.as_str()) else {
                        continue;
                    };
                    for target in targets.clone() {
                        if target == symbol.symbol_fqn {
                            continue;
                        }
                        let from = graph.node(&symbol.symbol_fqn);
                        let to = graph.node(&target);
                        graph
                            .graph
                            .add_edge(from, to, RELATION_CALLS.to_string());
                    }
                }
            }
        }
        graph
    }

    /// Invert `calls_out` across a namespace, filling `calls_in` in place.
    pub fn populate_calls_in(contexts: &mut [(String, AstFileContext)]) {
        let mut callers_by_terminal: HashMap<String, Vec<String>> = HashMap::new();
        for (_, context) in contexts.iter() {
            for symbol in &context.symbols {
                for callee in &symbol.calls_out {
                    callers_by_terminal
                        .entry(callee.clone())
                        .or_default()
                        .push(symbol.symbol_fqn.clone());
                }
            }
        }
        for (_, context) in contexts.iter_mut() {
            for symbol in &mut context.symbols {
                let terminal = terminal_name(&symbol.symbol_fqn);
                if let Some(callers) = callers_by_terminal.get(&terminal) {
                    for caller in callers {
                        if *caller != symbol.symbol_fqn
                            && !symbol.calls_in.contains(caller)
                        {
                            symbol.calls_in.push(caller.clone());
                        }
                    }
                }
            }
        }
    }

    /// `CALLED_BY` records mirroring a set of `CALLS` edges
    pub fn invert(edges: &[SymbolEdge]) -> Vec<SymbolEdge> {
        edges
            .iter()
            .filter(|edge| edge.relation == RELATION_CALLS)
            .map(|edge| SymbolEdge {
                file_path: edge.file_path.clone(),
                chunk_index: edge.chunk_index,
                chunk_hash: edge.chunk_hash.clone(),
                relation: RELATION_CALLED_BY.to_string(),
                symbol_fqn: edge.referenced_symbol_fqn.clone(),
                referenced_symbol_fqn: edge.symbol_fqn.clone(),
            })
            .collect()
    }
}

/// Terminal name segment of a symbol FQN: `pkg.Cls#run(intx)` -> `run`
fn terminal_name(fqn: &str) -> String {
    let tail = fqn.rsplit(['#', '.']).next().unwrap_or(fqn);
    match tail.find('(') {
        Some(position) => tail[..position].to_string(),
        None => tail.to_string(),
    }
}
