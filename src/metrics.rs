// Build metrics
//
// Counts pipeline outcomes across one orchestrator run for the closing summary

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counters for one orchestrator run
///
/// Updated once per pipeline and logged when the run ends.
#[derive(Debug)]
pub struct Metrics {
    /// Builds the backend reported as succeeded
    pub builds_succeeded: AtomicUsize,

    /// Builds the backend reported as failed
    pub builds_failed: AtomicUsize,

    /// Release builds refused by the validation gate
    pub builds_denied: AtomicUsize,

    /// Builds skipped because the host cannot produce the target
    pub builds_skipped: AtomicUsize,

    /// Total time spent inside the backend in milliseconds
    pub total_build_time_ms: AtomicU64,

    /// Total size of produced artifacts
    pub bytes_produced: AtomicU64,

    /// Run start time
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            builds_succeeded: AtomicUsize::new(0),
            builds_failed: AtomicUsize::new(0),
            builds_denied: AtomicUsize::new(0),
            builds_skipped: AtomicUsize::new(0),
            total_build_time_ms: AtomicU64::new(0),
            bytes_produced: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a successful build and the size of its artifact
    pub fn record_build_succeeded(&self, artifact_size_bytes: u64) {
        self.builds_succeeded.fetch_add(1, Ordering::Relaxed);
        self.bytes_produced
            .fetch_add(artifact_size_bytes, Ordering::Relaxed);
    }

    pub fn record_build_failed(&self) {
        self.builds_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_build_denied(&self) {
        self.builds_denied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_build_skipped(&self) {
        self.builds_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record time spent in the backend
    pub fn record_build_time(&self, duration: Duration) {
        self.total_build_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Number of pipelines that reached a final outcome
    pub fn total_builds(&self) -> usize {
        self.builds_succeeded.load(Ordering::Relaxed)
            + self.builds_failed.load(Ordering::Relaxed)
            + self.builds_denied.load(Ordering::Relaxed)
            + self.builds_skipped.load(Ordering::Relaxed)
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Build Summary ===");
        tracing::info!("Elapsed: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Builds: {} succeeded, {} failed, {} denied, {} skipped",
            self.builds_succeeded.load(Ordering::Relaxed),
            self.builds_failed.load(Ordering::Relaxed),
            self.builds_denied.load(Ordering::Relaxed),
            self.builds_skipped.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Backend time: {:.2}s, artifacts: {}",
            self.total_build_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            crate::models::format_size(self.bytes_produced.load(Ordering::Relaxed))
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
