use crate::config::{CodeAwareConfig, DiversityConfig, RerankConfig};
use crate::document::{keys, Document, Query};
use crate::pipeline::DocumentPostProcessor;
use async_trait::async_trait;
use std::collections::HashMap;

/// Code-aware re-scoring of the head window.
///
/// Only `min(len, ceil(top_n * head_multiplier))` leading documents are
/// re-ordered; the tail keeps its original ranking. The combined score is
/// multiplicative: base (similarity + span) × language bonus × symbol
/// priority × path penalty × diversity decay. The sort is stable, so equal
/// scores preserve their input order.
pub struct CodeAwareRescorer {
    config: CodeAwareConfig,
    rerank_top_n: usize,
    head_multiplier: f64,
    requested_language: Option<String>,
}

impl CodeAwareRescorer {
    pub fn new(
        config: CodeAwareConfig,
        rerank_top_n: usize,
        head_multiplier: f64,
        requested_language: Option<&str>,
    ) -> Self {
        let head_multiplier = head_multiplier.max(1.0).min(config.max_head_multiplier);
        Self {
            config,
            rerank_top_n: rerank_top_n.max(1),
            head_multiplier,
            requested_language: requested_language
                .map(|language| language.trim().to_lowercase())
                .filter(|language| !language.is_empty()),
        }
    }

    fn head_size(&self, document_count: usize) -> usize {
        let desired = (self.rerank_top_n as f64 * self.head_multiplier).ceil() as usize;
        desired.clamp(1, document_count)
    }

    fn base_score(&self, document: &Document) -> f64 {
        let mut score_weight = self.config.score.weight.clamp(0.0, 1.0);
        let mut span_weight = self.config.score.span_weight.clamp(0.0, 1.0);
        if score_weight + span_weight == 0.0 {
            score_weight = 0.7;
            span_weight = 0.3;
        }
        let similarity = document.score.unwrap_or(0.0);
        let span_score = 1.0 / document.line_span(40.0).max(1.0);
        score_weight * similarity + span_weight * span_score
    }

    fn language_bonus(&self, document: &Document) -> f64 {
        let Some(requested) = self.requested_language.as_deref() else {
            return 1.0;
        };
        let document_language = document.metadata_lower(keys::LANGUAGE);
        if document_language.as_deref() != Some(requested) {
            return 1.0;
        }
        if self.config.language_bonus.is_empty() {
            return 1.0;
        }
        self.config
            .language_bonus
            .get(requested)
            .or_else(|| self.config.language_bonus.get("*"))
            .copied()
            .filter(|bonus| *bonus > 0.0)
            .unwrap_or(1.0)
    }

    fn symbol_priority(&self, document: &Document) -> f64 {
        let priorities = &self.config.symbol_priority;
        if priorities.is_empty() {
            return 1.0;
        }
        let kind = document
            .metadata_lower(keys::SYMBOL_KIND)
            .or_else(|| derive_kind_from_parent(document));
        let visibility = document.metadata_lower(keys::SYMBOL_VISIBILITY);
        if let (Some(kind), Some(visibility)) = (kind.as_deref(), visibility.as_deref()) {
            if let Some(combined) = priorities.get(&format!("{kind}_{visibility}")) {
                return *combined;
            }
        }
        if let Some(kind) = kind.as_deref() {
            if let Some(direct) = priorities.get(kind) {
                return *direct;
            }
        }
        priorities.get("default").copied().unwrap_or(1.0)
    }

    fn path_penalty(&self, document: &Document) -> f64 {
        let Some(path) = document.metadata_str(keys::FILE_PATH) else {
            return 1.0;
        };
        let normalized = path.replace('\\', "/").to_lowercase();
        let penalty = &self.config.path_penalty;
        if matches_prefix(&normalized, &penalty.allow_prefixes) {
            return 1.0;
        }
        if matches_prefix(&normalized, &penalty.deny_prefixes) {
            return if penalty.penalty_multiplier > 0.0 {
                penalty.penalty_multiplier
            } else {
                0.2
            };
        }
        1.0
    }
}

#[async_trait]
impl DocumentPostProcessor for CodeAwareRescorer {
    async fn process(&self, _query: &Query, documents: Vec<Document>) -> Vec<Document> {
        if documents.is_empty() {
            return documents;
        }
        let head_size = self.head_size(documents.len());
        if head_size <= 1 {
            return documents;
        }
        let mut tracker = DiversityTracker::new(&self.config.diversity);
        let mut scored: Vec<(f64, Document)> = Vec::with_capacity(head_size);
        let mut iter = documents.into_iter();
        for document in iter.by_ref().take(head_size) {
            let combined = self.base_score(&document)
                * self.language_bonus(&document)
                * self.symbol_priority(&document)
                * self.path_penalty(&document)
                * tracker.weight(&document);
            scored.push((combined, document));
        }
        scored.sort_by(|left, right| right.0.total_cmp(&left.0));

        let mut result: Vec<Document> = scored.into_iter().map(|(_, doc)| doc).collect();
        result.extend(iter);
        result
    }
}

/// Legacy head-only re-score: weighted similarity plus span score.
pub struct HeuristicRescorer {
    rerank: RerankConfig,
}

impl HeuristicRescorer {
    pub fn new(rerank: RerankConfig) -> Self {
        Self { rerank }
    }

    fn combined_score(&self, document: &Document) -> f64 {
        let mut score_weight = self.rerank.score_weight.clamp(0.0, 1.0);
        let mut span_weight = self.rerank.span_weight.clamp(0.0, 1.0);
        if score_weight + span_weight == 0.0 {
            score_weight = 0.7;
            span_weight = 0.3;
        }
        let score = document.score.unwrap_or(0.0);
        let span_score = 1.0 / document.line_span(50.0).max(1.0);
        score_weight * score + span_weight * span_score
    }
}

#[async_trait]
impl DocumentPostProcessor for HeuristicRescorer {
    async fn process(&self, _query: &Query, documents: Vec<Document>) -> Vec<Document> {
        if documents.len() <= 1 {
            return documents;
        }
        let head_size = self.rerank.top_n.clamp(1, documents.len());
        let mut scored: Vec<(f64, Document)> = Vec::with_capacity(head_size);
        let mut iter = documents.into_iter();
        for document in iter.by_ref().take(head_size) {
            scored.push((self.combined_score(&document), document));
        }
        scored.sort_by(|left, right| right.0.total_cmp(&left.0));
        let mut result: Vec<Document> = scored.into_iter().map(|(_, doc)| doc).collect();
        result.extend(iter);
        result
    }
}

fn derive_kind_from_parent(document: &Document) -> Option<String> {
    let parent = document
        .metadata_str(keys::SYMBOL_FQN)
        .or_else(|| document.metadata_str(keys::PARENT_SYMBOL))?;
    parent
        .trim()
        .split_whitespace()
        .next()
        .map(str::to_lowercase)
}

fn matches_prefix(value: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| {
        let normalized = prefix.replace('\\', "/").to_lowercase();
        !normalized.is_empty() && value.starts_with(&normalized)
    })
}

/// Geometric decay for repeated files and symbols within the head window
struct DiversityTracker<'a> {
    diversity: &'a DiversityConfig,
    file_counts: HashMap<String, usize>,
    symbol_counts: HashMap<String, usize>,
}

impl<'a> DiversityTracker<'a> {
    fn new(diversity: &'a DiversityConfig) -> Self {
        Self {
            diversity,
            file_counts: HashMap::new(),
            symbol_counts: HashMap::new(),
        }
    }

    fn weight(&mut self, document: &Document) -> f64 {
        let file_weight = Self::compute(
            &mut self.file_counts,
            document.metadata_lower(keys::FILE_PATH).map(|p| p.replace('\\', "/")),
            self.diversity.max_per_file,
        );
        let symbol_key = document
            .metadata_lower(keys::SYMBOL_FQN)
            .or_else(|| document.metadata_lower(keys::PARENT_SYMBOL));
        let symbol_weight =
            Self::compute(&mut self.symbol_counts, symbol_key, self.diversity.max_per_symbol);
        file_weight * symbol_weight
    }

    fn compute(
        counts: &mut HashMap<String, usize>,
        key: Option<String>,
        max_allowed: usize,
    ) -> f64 {
        let Some(key) = key.filter(|k| !k.is_empty()) else {
            return 1.0;
        };
        if max_allowed == 0 {
            return 1.0;
        }
        let order = counts
            .entry(key)
            .and_modify(|count| *count += 1)
            .or_insert(1);
        if *order <= max_allowed {
            return 1.0;
        }
        (max_allowed as f64 / *order as f64).max(0.1)
    }
}
