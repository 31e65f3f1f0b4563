use camino::{Utf8Path, Utf8PathBuf};
use std::time::Duration;

/// Status of a backend invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    Succeeded,
    Failed,
}

/// Outcome of one backend invocation.
///
/// Constructed only through [`BuildResult::succeeded`] and
/// [`BuildResult::failed`] so the status and its fields always agree:
/// a succeeded result has an artifact path and zero errors, a failed result
/// has no artifact path and at least one error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    status: BuildStatus,
    artifact_path: Option<Utf8PathBuf>,
    artifact_size_bytes: u64,
    error_count: u32,
    duration: Duration,
    message: Option<String>,
}

impl BuildResult {
    pub fn succeeded(artifact_path: Utf8PathBuf, artifact_size_bytes: u64) -> Self {
        Self {
            status: BuildStatus::Succeeded,
            artifact_path: Some(artifact_path),
            artifact_size_bytes,
            error_count: 0,
            duration: Duration::ZERO,
            message: None,
        }
    }

    /// A failed build. An error count of zero is raised to one.
    pub fn failed(error_count: u32, message: impl Into<String>) -> Self {
        Self {
            status: BuildStatus::Failed,
            artifact_path: None,
            artifact_size_bytes: 0,
            error_count: error_count.max(1),
            duration: Duration::ZERO,
            message: Some(message.into()),
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn status(&self) -> BuildStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == BuildStatus::Succeeded
    }

    pub fn artifact_path(&self) -> Option<&Utf8Path> {
        self.artifact_path.as_deref()
    }

    pub fn artifact_size_bytes(&self) -> u64 {
        self.artifact_size_bytes
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Backend failure text, reported verbatim
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Human-readable byte size, e.g. `12.4 MiB`
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_succeeded_result() {
        let result = BuildResult::succeeded(Utf8PathBuf::from("Builds/android-debug.apk"), 2048);
        assert!(result.is_success());
        assert_eq!(result.error_count(), 0);
        assert_eq!(
            result.artifact_path(),
            Some(Utf8Path::new("Builds/android-debug.apk"))
        );
        assert_eq!(result.message(), None);
    }

    #[test]
    fn test_failed_result_has_no_artifact() {
        let result = BuildResult::failed(3, "compiler errors");
        assert_eq!(result.status(), BuildStatus::Failed);
        assert_eq!(result.error_count(), 3);
        assert_eq!(result.artifact_path(), None);
        assert_eq!(result.message(), Some("compiler errors"));
    }

    #[test]
    fn test_failed_result_counts_at_least_one_error() {
        let result = BuildResult::failed(0, "engine crashed");
        assert_eq!(result.error_count(), 1);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(5 * 1024 * 1024 + 512 * 1024), "5.5 MiB");
    }
}
