use crate::config::CompressionConfig;
use crate::document::{Document, Query};
use crate::pipeline::DocumentPostProcessor;
use crate::traits::LanguageModelClient;
use async_trait::async_trait;
use std::sync::Arc;

const SYSTEM_INSTRUCTIONS: &str = "You compress code snippets for a code question answering \
pipeline. Keep identifiers, signatures and control flow that matter for the question; drop \
boilerplate. Reply with the compressed snippet only.";

/// Optional LLM-backed compression of oversized snippets.
///
/// Only the first `max_compressed_documents` results whose text exceeds the
/// line threshold are sent to the model. Any failure — transport error,
/// blank or malformed output — keeps the original document; compression
/// never removes a result from the list.
pub struct SnippetCompressor {
    client: Arc<dyn LanguageModelClient>,
    config: CompressionConfig,
}

impl SnippetCompressor {
    pub fn new(client: Arc<dyn LanguageModelClient>, config: CompressionConfig) -> Self {
        Self { client, config }
    }

    fn needs_compression(&self, document: &Document) -> bool {
        document.text.lines().count() > self.config.max_snippet_lines
    }

    fn user_prompt(&self, query: &Query, document: &Document) -> String {
        format!(
            "Compress the following code snippet to at most {max_lines} lines. Answer in \
             locale \"{locale}\". Preserve the details needed to answer the query: \
             \"{query}\".\nSnippet:\n```\n{text}\n```\nAnswer:\n",
            max_lines = self.config.max_snippet_lines,
            locale = self.config.locale,
            query = query.text,
            text = document.text,
        )
    }

    async fn compress(&self, query: &Query, document: Document) -> Document {
        let prompt = self.user_prompt(query, &document);
        match self.client.complete(SYSTEM_INSTRUCTIONS, &prompt).await {
            Ok(compressed) if !compressed.trim().is_empty() => Document {
                id: document.id,
                text: compressed.trim().to_string(),
                score: document.score,
                metadata: document.metadata,
            },
            Ok(_) => document,
            Err(err) => {
                log::debug!("snippet compression failed: {err}");
                document
            }
        }
    }
}

#[async_trait]
impl DocumentPostProcessor for SnippetCompressor {
    async fn process(&self, query: &Query, documents: Vec<Document>) -> Vec<Document> {
        if !self.config.enabled || documents.is_empty() {
            return documents;
        }
        let mut result = Vec::with_capacity(documents.len());
        for (index, document) in documents.into_iter().enumerate() {
            if index >= self.config.max_compressed_documents || !self.needs_compression(&document)
            {
                result.push(document);
                continue;
            }
            result.push(self.compress(query, document).await);
        }
        result
    }
}
