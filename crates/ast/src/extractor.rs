use crate::config::AstConfig;
use crate::health::ParserHealth;
use crate::heuristic;
use crate::metadata::AstFileContext;
use crate::native::{NativeParser, TreeSitterNative};

/// Entry point for symbol extraction.
///
/// Prefers the native parser while it is enabled, healthy and the language is
/// supported; every failure is recorded and the heuristic scanner takes over.
/// Callers always receive a usable [`AstFileContext`].
pub struct AstExtractor {
    config: AstConfig,
    health: ParserHealth,
    native: Box<dyn NativeParser>,
}

impl AstExtractor {
    pub fn new(config: AstConfig) -> Self {
        let health = ParserHealth::new(config.failure_threshold);
        Self {
            config,
            health,
            native: Box::new(TreeSitterNative::new()),
        }
    }

    /// Construct with a custom native backend (used by tests and embedders)
    pub fn with_native(config: AstConfig, native: Box<dyn NativeParser>) -> Self {
        let health = ParserHealth::new(config.failure_threshold);
        Self {
            config,
            health,
            native,
        }
    }

    pub fn health(&self) -> &ParserHealth {
        &self.health
    }

    pub fn config(&self) -> &AstConfig {
        &self.config
    }

    fn native_eligible(&self, language: &str) -> bool {
        self.config.enabled
            && !self.health.is_degraded()
            && self.config.supports_language(language)
            && self.native.supports(language)
    }

    /// Extract symbols for one file. Never fails.
    pub fn parse(
        &self,
        content: &str,
        language: Option<&str>,
        relative_path: &str,
        native_enabled: bool,
    ) -> AstFileContext {
        let language = language.unwrap_or("");
        if native_enabled && self.native_eligible(language) {
            match self.native.parse(content, language, relative_path) {
                Ok(context) => {
                    self.health.record_success();
                    return context;
                }
                Err(err) => {
                    log::warn!("native parse failed for {relative_path}: {err}");
                    self.health.record_failure(language);
                }
            }
        }
        heuristic::extract(content, language, relative_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AstError, Result};

    struct FailingParser;

    impl NativeParser for FailingParser {
        fn supports(&self, _language: &str) -> bool {
            true
        }

        fn parse(&self, _content: &str, _language: &str, _path: &str) -> Result<AstFileContext> {
            Err(AstError::Parse("broken grammar".to_string()))
        }
    }

    struct CountingParser {
        calls: std::sync::atomic::AtomicU32,
    }

    impl NativeParser for CountingParser {
        fn supports(&self, _language: &str) -> bool {
            true
        }

        fn parse(&self, _content: &str, _language: &str, _path: &str) -> Result<AstFileContext> {
            self.calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Err(AstError::Parse("always fails".to_string()))
        }
    }

    const SOURCE: &str = "public class Sample {\n  public void run() {\n    step();\n  }\n}\n";

    #[test]
    fn falls_back_to_heuristics_on_native_failure() {
        let extractor = AstExtractor::with_native(AstConfig::default(), Box::new(FailingParser));
        let context = extractor.parse(SOURCE, Some("java"), "Sample.java", true);
        assert!(context.symbols.iter().any(|s| s.kind == "class"));
        assert_eq!(extractor.health().consecutive_failures(), 1);
    }

    #[test]
    fn degrades_permanently_after_threshold_failures() {
        let config = AstConfig {
            failure_threshold: 3,
            ..AstConfig::default()
        };
        let counting = Box::new(CountingParser {
            calls: std::sync::atomic::AtomicU32::new(0),
        });
        let extractor = AstExtractor::with_native(config, counting);

        for _ in 0..10 {
            let context = extractor.parse(SOURCE, Some("java"), "Sample.java", true);
            assert!(!context.symbols.is_empty());
        }

        assert!(extractor.health().is_degraded());
    }

    #[test]
    fn native_attempt_count_stops_at_threshold() {
        let config = AstConfig {
            failure_threshold: 3,
            ..AstConfig::default()
        };
        let extractor = AstExtractor::with_native(
            config,
            Box::new(CountingParser {
                calls: std::sync::atomic::AtomicU32::new(0),
            }),
        );

        for _ in 0..10 {
            extractor.parse(SOURCE, Some("java"), "Sample.java", true);
        }
        assert!(extractor.health().is_degraded());
        assert_eq!(extractor.health().consecutive_failures(), 3);
    }

    #[test]
    fn disabled_native_flag_skips_native_entirely() {
        let extractor = AstExtractor::with_native(AstConfig::default(), Box::new(FailingParser));
        let context = extractor.parse(SOURCE, Some("java"), "Sample.java", false);
        assert!(!context.symbols.is_empty());
        assert_eq!(extractor.health().consecutive_failures(), 0);
    }

    #[test]
    fn unsupported_language_goes_straight_to_heuristics() {
        let extractor = AstExtractor::with_native(AstConfig::default(), Box::new(FailingParser));
        let context = extractor.parse("x = 1\n", Some("cobol"), "calc.cob", true);
        assert!(!context.symbols.is_empty());
        assert_eq!(extractor.health().consecutive_failures(), 0);
    }

    #[test]
    fn missing_language_uses_heuristics() {
        let extractor = AstExtractor::new(AstConfig::default());
        let context = extractor.parse(SOURCE, None, "Sample.java", true);
        assert!(context.symbols.iter().any(|s| s.kind == "file"));
    }

    #[test]
    fn native_success_path_resets_counter() {
        let extractor = AstExtractor::new(AstConfig::default());
        let source = "pub struct Wire {}\n";
        let context = extractor.parse(source, Some("rust"), "src/wire.rs", true);
        assert!(context.symbols.iter().any(|s| s.kind == "struct"));
        assert_eq!(extractor.health().consecutive_failures(), 0);
        assert!(!extractor.health().is_degraded());
    }
}
