use crate::config::{NeighborConfig, NeighborStrategy};
use crate::document::{keys, Document, Query};
use crate::pipeline::DocumentPostProcessor;
use crate::traits::{ChunkLookup, SymbolGraph};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Expands the ranked list with structurally-related chunks.
///
/// Anchors are visited in rank order and may borrow additional documents
/// without re-querying the vector index. Every candidate is deduplicated
/// against a namespace-wide set of chunk hashes seeded from the input list;
/// inserted documents inherit the anchor's score and carry enrichment
/// metadata describing the relation.
pub struct NeighborExpander {
    lookup: Arc<dyn ChunkLookup>,
    graph: Arc<dyn SymbolGraph>,
    strategy: NeighborStrategy,
    radius: usize,
    limit: usize,
}

impl NeighborExpander {
    pub fn new(
        lookup: Arc<dyn ChunkLookup>,
        graph: Arc<dyn SymbolGraph>,
        config: &NeighborConfig,
    ) -> Self {
        Self {
            lookup,
            graph,
            strategy: config.strategy,
            radius: config.effective_radius(),
            limit: config.effective_limit(),
        }
    }

    fn find_neighbors(
        &self,
        anchor: &Document,
        seen: &HashSet<String>,
        remaining_budget: usize,
    ) -> Vec<Document> {
        match self.strategy {
            NeighborStrategy::Off => Vec::new(),
            NeighborStrategy::Linear => self.expand_linear(anchor, seen, remaining_budget),
            NeighborStrategy::ParentSymbol => {
                self.expand_parent_symbol(anchor, seen, remaining_budget)
            }
            NeighborStrategy::CallGraph => self.expand_call_graph(anchor, seen, remaining_budget),
        }
    }

    fn expand_linear(
        &self,
        anchor: &Document,
        seen: &HashSet<String>,
        remaining_budget: usize,
    ) -> Vec<Document> {
        if self.radius == 0 {
            return Vec::new();
        }
        let (Some(namespace), Some(file_path), Some(chunk_index)) = (
            anchor.metadata_str(keys::NAMESPACE),
            anchor.metadata_str(keys::FILE_PATH),
            anchor.metadata_i64(keys::CHUNK_INDEX),
        ) else {
            return Vec::new();
        };
        // Closer chunk indexes first, lower side before upper at each step.
        let mut ordered_indexes = Vec::with_capacity(self.radius * 2);
        for offset in 1..=self.radius as i64 {
            if chunk_index - offset >= 0 {
                ordered_indexes.push(chunk_index - offset);
            }
            ordered_indexes.push(chunk_index + offset);
        }
        self.load_by_chunk_indexes(
            namespace,
            file_path,
            &ordered_indexes,
            seen,
            remaining_budget,
            anchor,
            &[(keys::NEIGHBOR_RELATION, Value::from("LINEAR"))],
        )
    }

    fn expand_parent_symbol(
        &self,
        anchor: &Document,
        seen: &HashSet<String>,
        remaining_budget: usize,
    ) -> Vec<Document> {
        let (Some(namespace), Some(file_path), Some(symbol)) = (
            anchor.metadata_str(keys::NAMESPACE),
            anchor.metadata_str(keys::FILE_PATH),
            anchor_symbol(anchor),
        ) else {
            return Vec::new();
        };
        let mut candidates: Vec<Document> = self
            .lookup
            .find_by_file(namespace, file_path)
            .into_iter()
            .filter(|candidate| symbol_matches(candidate, &symbol))
            .collect();
        if candidates.is_empty() {
            log::debug!("no parent-symbol neighbors (namespace={namespace}, file={file_path})");
            return Vec::new();
        }
        candidates.sort_by_key(|candidate| candidate.metadata_i64(keys::CHUNK_INDEX).unwrap_or(0));
        let enrichment = [
            (keys::NEIGHBOR_RELATION, Value::from("PARENT_SYMBOL")),
            (keys::NEIGHBOR_SYMBOL, Value::from(symbol.clone())),
        ];
        collect_unseen(candidates, seen, remaining_budget, anchor, &enrichment)
    }

    fn expand_call_graph(
        &self,
        anchor: &Document,
        seen: &HashSet<String>,
        remaining_budget: usize,
    ) -> Vec<Document> {
        let (Some(namespace), Some(symbol)) =
            (anchor.metadata_str(keys::NAMESPACE), anchor_symbol(anchor))
        else {
            return Vec::new();
        };
        let references = self.graph.find_referenced_symbols(namespace, &symbol);
        if references.is_empty() {
            log::debug!("call graph neighbors unavailable (namespace={namespace}, symbol={symbol})");
            return Vec::new();
        }
        // Group by file, preserving first-appearance order of the edges.
        let mut by_file: Vec<(String, Vec<i64>, String)> = Vec::new();
        for edge in references {
            match by_file.iter_mut().find(|(file, _, _)| *file == edge.file_path) {
                Some((_, indexes, _)) => indexes.push(edge.chunk_index),
                None => by_file.push((
                    edge.file_path.clone(),
                    vec![edge.chunk_index],
                    edge.referenced_symbol_fqn.clone(),
                )),
            }
        }
        let mut collected: Vec<Document> = Vec::new();
        let mut remaining = remaining_budget;
        for (file_path, indexes, referenced) in by_file {
            if remaining == 0 {
                break;
            }
            let enrichment = [
                (keys::NEIGHBOR_RELATION, Value::from("CALL_GRAPH")),
                (keys::NEIGHBOR_SYMBOL, Value::from(symbol.clone())),
                (keys::NEIGHBOR_REFERENCED_SYMBOL, Value::from(referenced)),
            ];
            let mut seen_with_collected: HashSet<String> = seen.clone();
            for doc in &collected {
                if let Some(hash) = doc.chunk_hash() {
                    seen_with_collected.insert(hash.to_string());
                }
            }
            let neighbors = self.load_by_chunk_indexes(
                namespace,
                &file_path,
                &indexes,
                &seen_with_collected,
                remaining,
                anchor,
                &enrichment,
            );
            remaining -= neighbors.len();
            collected.extend(neighbors);
        }
        collected
    }

    #[allow(clippy::too_many_arguments)]
    fn load_by_chunk_indexes(
        &self,
        namespace: &str,
        file_path: &str,
        ordered_indexes: &[i64],
        seen: &HashSet<String>,
        remaining_budget: usize,
        anchor: &Document,
        enrichment: &[(&str, Value)],
    ) -> Vec<Document> {
        if ordered_indexes.is_empty() {
            return Vec::new();
        }
        let mut unique_indexes = Vec::with_capacity(ordered_indexes.len());
        for index in ordered_indexes {
            if !unique_indexes.contains(index) {
                unique_indexes.push(*index);
            }
        }
        let fetched = self
            .lookup
            .find_by_chunk_indexes(namespace, file_path, &unique_indexes);
        if fetched.is_empty() {
            log::debug!(
                "no neighbors fetched (namespace={namespace}, file={file_path}, indexes={unique_indexes:?})"
            );
            return Vec::new();
        }
        let mut ordered = Vec::new();
        for index in &unique_indexes {
            let Some(candidate) = fetched
                .iter()
                .find(|doc| doc.metadata_i64(keys::CHUNK_INDEX) == Some(*index))
            else {
                continue;
            };
            let enriched = enrich(candidate.clone(), anchor, enrichment);
            let Some(hash) = enriched.chunk_hash() else {
                continue;
            };
            if seen.contains(hash) || ordered.iter().any(|d: &Document| d.chunk_hash() == Some(hash))
            {
                continue;
            }
            ordered.push(enriched);
            if ordered.len() >= remaining_budget {
                break;
            }
        }
        ordered
    }
}

#[async_trait]
impl DocumentPostProcessor for NeighborExpander {
    async fn process(&self, _query: &Query, documents: Vec<Document>) -> Vec<Document> {
        if self.strategy == NeighborStrategy::Off || self.limit == 0 || documents.is_empty() {
            return documents;
        }
        if self.strategy == NeighborStrategy::CallGraph {
            let namespace = documents[0].metadata_str(keys::NAMESPACE).unwrap_or("");
            if !self.graph.is_ready(namespace) {
                log::debug!("call graph not ready for namespace {namespace}, skipping expansion");
                return documents;
            }
        }
        let mut seen: HashSet<String> = documents
            .iter()
            .filter_map(|doc| doc.chunk_hash().map(str::to_string))
            .collect();
        let mut result = Vec::with_capacity(documents.len() + self.limit);
        let mut inserted = 0usize;
        for document in documents {
            let neighbors = if inserted < self.limit {
                self.find_neighbors(&document, &seen, self.limit - inserted)
            } else {
                Vec::new()
            };
            result.push(document);
            for neighbor in neighbors {
                if let Some(hash) = neighbor.chunk_hash() {
                    seen.insert(hash.to_string());
                }
                result.push(neighbor);
                inserted += 1;
                if inserted >= self.limit {
                    break;
                }
            }
        }
        result
    }
}

fn anchor_symbol(anchor: &Document) -> Option<String> {
    anchor
        .metadata_str(keys::SYMBOL_FQN)
        .or_else(|| anchor.metadata_str(keys::PARENT_SYMBOL))
        .map(str::to_string)
}

fn symbol_matches(candidate: &Document, target: &str) -> bool {
    if let Some(symbol_fqn) = candidate.metadata_str(keys::SYMBOL_FQN) {
        return symbol_fqn.eq_ignore_ascii_case(target);
    }
    candidate
        .metadata_str(keys::PARENT_SYMBOL)
        .is_some_and(|parent| parent.eq_ignore_ascii_case(target))
}

fn enrich(mut neighbor: Document, anchor: &Document, enrichment: &[(&str, Value)]) -> Document {
    for (key, value) in enrichment {
        neighbor.metadata.insert((*key).to_string(), value.clone());
    }
    if let Some(anchor_hash) = anchor.chunk_hash() {
        neighbor.metadata.insert(
            keys::NEIGHBOR_OF_SPAN_HASH.to_string(),
            Value::from(anchor_hash),
        );
    }
    neighbor.score = anchor.score;
    neighbor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::SymbolEdge;
    use pretty_assertions::assert_eq;

    fn doc(id: &str, namespace: &str, file: &str, index: i64, hash: &str) -> Document {
        Document::new(id, format!("chunk {id}"), Some(0.9))
            .with_metadata(keys::NAMESPACE, namespace)
            .with_metadata(keys::FILE_PATH, file)
            .with_metadata(keys::CHUNK_INDEX, index)
            .with_metadata(keys::CHUNK_HASH, hash)
    }

    struct FakeLookup {
        documents: Vec<Document>,
    }

    impl ChunkLookup for FakeLookup {
        fn find_by_file(&self, namespace: &str, file_path: &str) -> Vec<Document> {
            self.documents
                .iter()
                .filter(|doc| {
                    doc.metadata_str(keys::NAMESPACE) == Some(namespace)
                        && doc.metadata_str(keys::FILE_PATH) == Some(file_path)
                })
                .cloned()
                .collect()
        }

        fn find_by_chunk_indexes(
            &self,
            namespace: &str,
            file_path: &str,
            chunk_indexes: &[i64],
        ) -> Vec<Document> {
            self.find_by_file(namespace, file_path)
                .into_iter()
                .filter(|doc| {
                    doc.metadata_i64(keys::CHUNK_INDEX)
                        .is_some_and(|index| chunk_indexes.contains(&index))
                })
                .collect()
        }
    }

    struct FakeGraph {
        ready: bool,
        edges: Vec<SymbolEdge>,
    }

    impl SymbolGraph for FakeGraph {
        fn is_ready(&self, _namespace: &str) -> bool {
            self.ready
        }

        fn find_referenced_symbols(&self, _namespace: &str, symbol_fqn: &str) -> Vec<SymbolEdge> {
            self.edges
                .iter()
                .filter(|edge| edge.symbol_fqn == symbol_fqn)
                .cloned()
                .collect()
        }
    }

    fn expander(
        store: Vec<Document>,
        graph: FakeGraph,
        config: NeighborConfig,
    ) -> NeighborExpander {
        NeighborExpander::new(
            Arc::new(FakeLookup { documents: store }),
            Arc::new(graph),
            &config,
        )
    }

    fn no_graph() -> FakeGraph {
        FakeGraph {
            ready: true,
            edges: Vec::new(),
        }
    }

    #[tokio::test]
    async fn linear_expansion_fetches_adjacent_chunks() {
        let store = vec![
            doc("s0", "ns", "a.rs", 0, "h0"),
            doc("s1", "ns", "a.rs", 1, "h1"),
            doc("s2", "ns", "a.rs", 2, "h2"),
            doc("s3", "ns", "a.rs", 3, "h3"),
        ];
        let config = NeighborConfig {
            strategy: NeighborStrategy::Linear,
            radius: 1,
            limit: 6,
            ..NeighborConfig::default()
        };
        let stage = expander(store, no_graph(), config);

        let input = vec![doc("anchor", "ns", "a.rs", 2, "h2")];
        let result = stage.process(&Query::new("q"), input).await;

        assert_eq!(result.len(), 3);
        assert_eq!(result[1].metadata_i64(keys::CHUNK_INDEX), Some(1));
        assert_eq!(result[2].metadata_i64(keys::CHUNK_INDEX), Some(3));
        assert_eq!(
            result[1].metadata_str(keys::NEIGHBOR_RELATION),
            Some("LINEAR")
        );
        assert_eq!(result[1].score, Some(0.9));
        assert_eq!(
            result[1].metadata_str(keys::NEIGHBOR_OF_SPAN_HASH),
            Some("h2")
        );
    }

    #[tokio::test]
    async fn no_duplicate_hashes_after_expansion() {
        let store = vec![
            doc("s0", "ns", "a.rs", 0, "h0"),
            doc("s1", "ns", "a.rs", 1, "h1"),
            doc("s2", "ns", "a.rs", 2, "h2"),
        ];
        let config = NeighborConfig {
            strategy: NeighborStrategy::Linear,
            radius: 2,
            limit: 10,
            ..NeighborConfig::default()
        };
        let stage = expander(store, no_graph(), config);

        let input = vec![
            doc("a0", "ns", "a.rs", 0, "h0"),
            doc("a1", "ns", "a.rs", 1, "h1"),
            doc("a2", "ns", "a.rs", 2, "h2"),
        ];
        let result = stage.process(&Query::new("q"), input).await;

        let hashes: Vec<&str> = result.iter().filter_map(Document::chunk_hash).collect();
        let unique: HashSet<&str> = hashes.iter().copied().collect();
        assert_eq!(hashes.len(), unique.len());
        assert_eq!(result.len(), 3);
    }

    #[tokio::test]
    async fn insertion_cap_limits_total_neighbors() {
        let store: Vec<Document> = (0..20)
            .map(|i| doc(&format!("s{i}"), "ns", "a.rs", i, &format!("h{i}")))
            .collect();
        let config = NeighborConfig {
            strategy: NeighborStrategy::Linear,
            radius: 5,
            limit: 3,
            ..NeighborConfig::default()
        };
        let stage = expander(store, no_graph(), config);

        let input = vec![doc("anchor", "ns", "a.rs", 10, "h10")];
        let result = stage.process(&Query::new("q"), input).await;
        assert_eq!(result.len(), 4);
    }

    #[tokio::test]
    async fn off_strategy_is_a_no_op() {
        let config = NeighborConfig {
            strategy: NeighborStrategy::Off,
            ..NeighborConfig::default()
        };
        let stage = expander(Vec::new(), no_graph(), config);
        let input = vec![doc("anchor", "ns", "a.rs", 0, "h0")];
        let result = stage.process(&Query::new("q"), input.clone()).await;
        assert_eq!(result, input);
    }

    #[tokio::test]
    async fn zero_limit_is_a_no_op() {
        let config = NeighborConfig {
            strategy: NeighborStrategy::Linear,
            limit: 0,
            ..NeighborConfig::default()
        };
        let stage = expander(Vec::new(), no_graph(), config);
        let input = vec![doc("anchor", "ns", "a.rs", 0, "h0")];
        let result = stage.process(&Query::new("q"), input.clone()).await;
        assert_eq!(result, input);
    }

    #[tokio::test]
    async fn parent_symbol_expansion_matches_symbol_fqn() {
        let store = vec![
            doc("s0", "ns", "a.rs", 0, "h0").with_metadata(keys::SYMBOL_FQN, "demo.Foo"),
            doc("s1", "ns", "a.rs", 1, "h1").with_metadata(keys::SYMBOL_FQN, "demo.Foo"),
            doc("s2", "ns", "a.rs", 2, "h2").with_metadata(keys::SYMBOL_FQN, "demo.Bar"),
        ];
        let config = NeighborConfig {
            strategy: NeighborStrategy::ParentSymbol,
            limit: 6,
            ..NeighborConfig::default()
        };
        let stage = expander(store, no_graph(), config);

        let input =
            vec![doc("anchor", "ns", "a.rs", 5, "ha").with_metadata(keys::SYMBOL_FQN, "demo.Foo")];
        let result = stage.process(&Query::new("q"), input).await;

        assert_eq!(result.len(), 3);
        assert_eq!(result[1].id, "s0");
        assert_eq!(result[2].id, "s1");
        assert_eq!(
            result[1].metadata_str(keys::NEIGHBOR_SYMBOL),
            Some("demo.Foo")
        );
    }

    #[tokio::test]
    async fn call_graph_skips_already_present_hashes() {
        // Scenario: document 1's only call-graph neighbor is document 2's
        // chunk hash, so nothing is inserted.
        let store = vec![doc("s2", "ns", "b.rs", 0, "h2")];
        let graph = FakeGraph {
            ready: true,
            edges: vec![SymbolEdge {
                file_path: "b.rs".to_string(),
                chunk_index: 0,
                chunk_hash: "h2".to_string(),
                relation: "CALLS".to_string(),
                symbol_fqn: "demo.A".to_string(),
                referenced_symbol_fqn: "demo.B".to_string(),
            }],
        };
        let config = NeighborConfig {
            strategy: NeighborStrategy::CallGraph,
            limit: 6,
            ..NeighborConfig::default()
        };
        let stage = expander(store, graph, config);

        let input = vec![
            doc("d1", "ns", "a.rs", 0, "h1").with_metadata(keys::SYMBOL_FQN, "demo.A"),
            doc("d2", "ns", "b.rs", 0, "h2").with_metadata(keys::SYMBOL_FQN, "demo.B"),
        ];
        let result = stage.process(&Query::new("q"), input.clone()).await;
        assert_eq!(result, input);
    }

    #[tokio::test]
    async fn call_graph_inserts_referenced_chunks() {
        let store = vec![doc("callee", "ns", "b.rs", 4, "hb")];
        let graph = FakeGraph {
            ready: true,
            edges: vec![SymbolEdge {
                file_path: "b.rs".to_string(),
                chunk_index: 4,
                chunk_hash: "hb".to_string(),
                relation: "CALLS".to_string(),
                symbol_fqn: "demo.A".to_string(),
                referenced_symbol_fqn: "demo.B".to_string(),
            }],
        };
        let config = NeighborConfig {
            strategy: NeighborStrategy::CallGraph,
            limit: 6,
            ..NeighborConfig::default()
        };
        let stage = expander(store, graph, config);

        let input =
            vec![doc("d1", "ns", "a.rs", 0, "h1").with_metadata(keys::SYMBOL_FQN, "demo.A")];
        let result = stage.process(&Query::new("q"), input).await;

        assert_eq!(result.len(), 2);
        assert_eq!(result[1].id, "callee");
        assert_eq!(
            result[1].metadata_str(keys::NEIGHBOR_REFERENCED_SYMBOL),
            Some("demo.B")
        );
        assert_eq!(
            result[1].metadata_str(keys::NEIGHBOR_RELATION),
            Some("CALL_GRAPH")
        );
    }

    #[tokio::test]
    async fn call_graph_disabled_when_not_ready() {
        let store = vec![doc("callee", "ns", "b.rs", 4, "hb")];
        let graph = FakeGraph {
            ready: false,
            edges: vec![SymbolEdge {
                file_path: "b.rs".to_string(),
                chunk_index: 4,
                chunk_hash: "hb".to_string(),
                relation: "CALLS".to_string(),
                symbol_fqn: "demo.A".to_string(),
                referenced_symbol_fqn: "demo.B".to_string(),
            }],
        };
        let config = NeighborConfig {
            strategy: NeighborStrategy::CallGraph,
            limit: 6,
            ..NeighborConfig::default()
        };
        let stage = expander(store, graph, config);
        let input =
            vec![doc("d1", "ns", "a.rs", 0, "h1").with_metadata(keys::SYMBOL_FQN, "demo.A")];
        let result = stage.process(&Query::new("q"), input.clone()).await;
        assert_eq!(result, input);
    }

    #[tokio::test]
    async fn missing_metadata_yields_no_neighbors() {
        let config = NeighborConfig {
            strategy: NeighborStrategy::Linear,
            ..NeighborConfig::default()
        };
        let stage = expander(Vec::new(), no_graph(), config);
        let input = vec![Document::new("bare", "text", Some(0.5))];
        let result = stage.process(&Query::new("q"), input.clone()).await;
        assert_eq!(result, input);
    }
}
