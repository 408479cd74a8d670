use crate::document::{Document, Query};
use async_trait::async_trait;

/// Contract shared by every post-processing stage.
///
/// Stages are pure transformations over the ranked list; they never re-query
/// the index and never fail — degraded behavior is always "return the input".
#[async_trait]
pub trait DocumentPostProcessor: Send + Sync {
    async fn process(&self, query: &Query, documents: Vec<Document>) -> Vec<Document>;
}

/// Fixed-order composition of post-processing stages.
///
/// The canonical chain is re-score, neighbor expansion, budget truncation and
/// optional compression; callers assemble whichever subset applies.
#[derive(Default)]
pub struct PostProcessingPipeline {
    stages: Vec<Box<dyn DocumentPostProcessor>>,
}

impl PostProcessingPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_stage(mut self, stage: Box<dyn DocumentPostProcessor>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub async fn process(&self, query: &Query, mut documents: Vec<Document>) -> Vec<Document> {
        for stage in &self.stages {
            documents = stage.process(query, documents).await;
        }
        documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Reverse;

    #[async_trait]
    impl DocumentPostProcessor for Reverse {
        async fn process(&self, _query: &Query, mut documents: Vec<Document>) -> Vec<Document> {
            documents.reverse();
            documents
        }
    }

    struct TakeOne;

    #[async_trait]
    impl DocumentPostProcessor for TakeOne {
        async fn process(&self, _query: &Query, mut documents: Vec<Document>) -> Vec<Document> {
            documents.truncate(1);
            documents
        }
    }

    #[tokio::test]
    async fn stages_run_in_registration_order() {
        let pipeline = PostProcessingPipeline::new()
            .with_stage(Box::new(Reverse))
            .with_stage(Box::new(TakeOne));
        let docs = vec![Document::new("a", "a", None), Document::new("b", "b", None)];
        let out = pipeline.process(&Query::new("q"), docs).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "b");
    }

    #[tokio::test]
    async fn empty_pipeline_is_identity() {
        let pipeline = PostProcessingPipeline::new();
        assert!(pipeline.is_empty());
        let docs = vec![Document::new("a", "a", Some(0.5))];
        let out = pipeline.process(&Query::new("q"), docs.clone()).await;
        assert_eq!(out, docs);
    }
}
