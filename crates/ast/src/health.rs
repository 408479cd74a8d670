use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Process-wide health tracking for the native parsing path.
///
/// Consecutive failures are counted atomically; once the threshold is reached
/// the degraded flag is set and stays set until an explicit [`reset`].
/// A successful native parse resets the counter.
///
/// [`reset`]: ParserHealth::reset
#[derive(Debug)]
pub struct ParserHealth {
    consecutive_failures: AtomicU32,
    degraded: AtomicBool,
    failure_threshold: u32,
}

impl ParserHealth {
    pub fn new(failure_threshold: u32) -> Self {
        Self {
            consecutive_failures: AtomicU32::new(0),
            degraded: AtomicBool::new(false),
            failure_threshold: failure_threshold.max(1),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::SeqCst)
    }

    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
    }

    pub fn record_failure(&self, language: &str) {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
        log::warn!(
            "native parser unavailable for language {language} (failure {failures}/{})",
            self.failure_threshold
        );
        if failures >= self.failure_threshold && !self.degraded.swap(true, Ordering::SeqCst) {
            log::error!("native parsing disabled after {failures} consecutive failures");
        }
    }

    /// Clear both the counter and the degraded flag
    pub fn reset(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
        self.degraded.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrades_at_threshold() {
        let health = ParserHealth::new(3);
        health.record_failure("java");
        health.record_failure("java");
        assert!(!health.is_degraded());
        health.record_failure("java");
        assert!(health.is_degraded());
    }

    #[test]
    fn success_resets_counter_but_not_degraded_flag() {
        let health = ParserHealth::new(2);
        health.record_failure("java");
        health.record_success();
        assert_eq!(health.consecutive_failures(), 0);
        health.record_failure("java");
        health.record_failure("java");
        assert!(health.is_degraded());
        // Success after degrade does not lift the flag.
        health.record_success();
        assert!(health.is_degraded());
    }

    #[test]
    fn reset_clears_everything() {
        let health = ParserHealth::new(1);
        health.record_failure("java");
        assert!(health.is_degraded());
        health.reset();
        assert!(!health.is_degraded());
        assert_eq!(health.consecutive_failures(), 0);
    }
}
