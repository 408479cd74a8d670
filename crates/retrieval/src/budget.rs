use crate::config::BudgetConfig;
use crate::document::{Document, Query};
use crate::pipeline::DocumentPostProcessor;
use async_trait::async_trait;

/// Greedy token-budget truncation of the document list.
///
/// Tokens are approximated as `max(1, text_length / 4)`. The first document
/// is always kept, even when it alone exceeds the budget; truncation stops at
/// the first subsequent document that would overflow. A budget of zero or
/// less disables the stage.
pub struct ContextWindowBudget {
    max_context_tokens: i64,
}

impl ContextWindowBudget {
    pub fn new(config: &BudgetConfig) -> Self {
        Self {
            max_context_tokens: config.max_context_tokens,
        }
    }
}

#[async_trait]
impl DocumentPostProcessor for ContextWindowBudget {
    async fn process(&self, _query: &Query, documents: Vec<Document>) -> Vec<Document> {
        if self.max_context_tokens <= 0 || documents.is_empty() {
            return documents;
        }
        let mut result = Vec::new();
        let mut remaining = self.max_context_tokens;
        for document in documents {
            let tokens = estimate_tokens(&document.text);
            if !result.is_empty() && tokens > remaining {
                break;
            }
            result.push(document);
            remaining -= tokens;
            if remaining <= 0 {
                break;
            }
        }
        result
    }
}

fn estimate_tokens(text: &str) -> i64 {
    if text.trim().is_empty() {
        return 0;
    }
    (text.len() as i64 / 4).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, chars: usize) -> Document {
        Document::new(id, "x".repeat(chars), Some(0.5))
    }

    fn stage(max: i64) -> ContextWindowBudget {
        ContextWindowBudget::new(&BudgetConfig {
            max_context_tokens: max,
        })
    }

    #[tokio::test]
    async fn first_document_survives_even_over_budget() {
        let result = stage(10)
            .process(&Query::new("q"), vec![doc("big", 4000), doc("next", 4)])
            .await;
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "big");
    }

    #[tokio::test]
    async fn stops_at_first_overflowing_document() {
        // 100 tokens budget: 40 + 40 fit, the third 40 does not.
        let result = stage(100)
            .process(
                &Query::new("q"),
                vec![doc("a", 160), doc("b", 160), doc("c", 160)],
            )
            .await;
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn cumulative_tokens_stay_within_budget_after_first() {
        let documents: Vec<Document> = (0..10).map(|i| doc(&format!("d{i}"), 100)).collect();
        let budget = 110;
        let result = stage(budget).process(&Query::new("q"), documents).await;
        let total: i64 = result.iter().map(|d| estimate_tokens(&d.text)).sum();
        assert!(total <= budget.max(estimate_tokens(&result[0].text)));
    }

    #[tokio::test]
    async fn zero_budget_disables_the_stage() {
        let documents = vec![doc("a", 100), doc("b", 100)];
        let result = stage(0).process(&Query::new("q"), documents.clone()).await;
        assert_eq!(result, documents);
    }

    #[tokio::test]
    async fn blank_documents_cost_nothing() {
        let documents = vec![Document::new("blank", "   ", None), doc("a", 40)];
        let result = stage(11).process(&Query::new("q"), documents).await;
        assert_eq!(result.len(), 2);
    }
}
