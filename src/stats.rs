//! Run statistics
//!
//! Sprint 2: run-scoped counters and the end-of-run status block
//!
//! One `PipelineStats` value lives inside the controller for the lifetime of
//! a run and is the single mutation point for every counter. At run end it
//! collapses into the seven-field `SummaryRecord` handed to the reporting
//! sink.

use std::time::Duration;

use serde::Serialize;

/// Aggregate counters for one harness run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Trials attempted, whatever their outcome
    pub tries: u64,
    /// Trials discarded before verification (compile failure or tool timeout)
    pub failures: u64,
    /// Trials where every optimization level compiled
    pub successes: u64,
    /// Trials flagged by the regression heuristic
    pub regressions: u64,
    /// Wall-clock time accumulated across trials
    pub total_time: Duration,
    /// Run time at which the first regression was observed
    pub first_regression: Option<Duration>,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_try(&mut self) {
        self.tries += 1;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub fn record_success(&mut self) {
        self.successes += 1;
    }

    /// Record a flagged trial; only the first occurrence pins the
    /// time-to-first-regression.
    pub fn record_regression(&mut self, at: Duration) {
        self.regressions += 1;
        if self.first_regression.is_none() {
            self.first_regression = Some(at);
        }
    }

    pub fn add_elapsed(&mut self, elapsed: Duration) {
        self.total_time += elapsed;
    }

    /// Collapse the counters into the summary record for `fuzzer`
    pub fn summary(&self, fuzzer: &str) -> SummaryRecord {
        SummaryRecord {
            fuzzer: fuzzer.to_string(),
            total_tries: self.tries,
            total_time: self.total_time.as_secs_f64(),
            failures: self.failures,
            success: self.successes,
            regressions: self.regressions,
            first_regression_time: self.first_regression.map_or(0.0, |d| d.as_secs_f64()),
        }
    }

    /// Render the human-readable status block printed at run end
    pub fn to_status_string(&self) -> String {
        let mut report = String::new();
        report.push_str(&format!(
            "Total time: {:.2}s\n",
            self.total_time.as_secs_f64()
        ));
        report.push_str(&format!("Total tries: {}\n", self.tries));
        report.push_str(&format!("Failures: {}\n", self.failures));
        report.push_str(&format!("Successes: {}\n", self.successes));
        report.push_str(&format!("Regressions: {}\n", self.regressions));
        if let Some(first) = self.first_regression {
            report.push_str(&format!(
                "First regression time: {:.2}s\n",
                first.as_secs_f64()
            ));
        }
        report
    }
}

/// Final seven-field record persisted by the reporting sink.
///
/// Field names are the columns of `results.csv`; `first_regression_time`
/// keeps the zero sentinel for runs that never flagged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    pub fuzzer: String,
    pub total_tries: u64,
    pub total_time: f64,
    pub failures: u64,
    pub success: u64,
    pub regressions: u64,
    pub first_regression_time: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stats_are_zeroed() {
        let stats = PipelineStats::new();
        assert_eq!(stats.tries, 0);
        assert_eq!(stats.failures, 0);
        assert_eq!(stats.successes, 0);
        assert_eq!(stats.regressions, 0);
        assert_eq!(stats.total_time, Duration::ZERO);
        assert_eq!(stats.first_regression, None);
    }

    #[test]
    fn test_first_regression_pinned_once() {
        let mut stats = PipelineStats::new();
        stats.record_regression(Duration::from_secs(10));
        stats.record_regression(Duration::from_secs(99));
        assert_eq!(stats.regressions, 2);
        assert_eq!(stats.first_regression, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_elapsed_accumulates() {
        let mut stats = PipelineStats::new();
        stats.add_elapsed(Duration::from_millis(1500));
        stats.add_elapsed(Duration::from_millis(500));
        assert_eq!(stats.total_time, Duration::from_secs(2));
    }

    #[test]
    fn test_summary_uses_zero_sentinel_without_regression() {
        let mut stats = PipelineStats::new();
        stats.record_try();
        stats.record_success();
        stats.add_elapsed(Duration::from_secs(3));

        let summary = stats.summary("yarpgen");
        assert_eq!(summary.fuzzer, "yarpgen");
        assert_eq!(summary.total_tries, 1);
        assert_eq!(summary.success, 1);
        assert_eq!(summary.failures, 0);
        assert_eq!(summary.regressions, 0);
        assert_eq!(summary.first_regression_time, 0.0);
    }

    #[test]
    fn test_status_block_hides_first_regression_when_clean() {
        let stats = PipelineStats::new();
        let block = stats.to_status_string();
        assert!(block.contains("Total time:"));
        assert!(block.contains("Regressions: 0"));
        assert!(!block.contains("First regression time"));
    }

    #[test]
    fn test_status_block_shows_first_regression() {
        let mut stats = PipelineStats::new();
        stats.record_regression(Duration::from_secs_f64(12.34));
        let block = stats.to_status_string();
        assert!(block.contains("Regressions: 1"));
        assert!(block.contains("First regression time: 12.34s"));
    }
}
