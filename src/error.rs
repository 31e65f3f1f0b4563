use crate::models::BuildTarget;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that end a build pipeline.
///
/// Every variant is fatal for the pipeline it occurs in. Only
/// [`BuildError::PlatformUnavailable`] is downgraded to a warning, and only
/// inside `build-all`.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(
        "validation: configuration resource not found at {resource}; create it and set `backend_url` before building a release"
    )]
    ConfigurationMissing { resource: Utf8PathBuf },

    #[error(
        "validation: configuration is not ready for a release build (backend_url = {endpoint:?}); set `backend_url` in {resource} to the production endpoint"
    )]
    ConfigurationNotReady {
        resource: Utf8PathBuf,
        endpoint: String,
    },

    #[error("backend: {target} build failed with {error_count} error(s): {message}")]
    BackendFailure {
        target: BuildTarget,
        error_count: u32,
        message: String,
    },

    #[error("host: {target} cannot be built on this machine: {reason}")]
    PlatformUnavailable { target: BuildTarget, reason: String },

    #[error(
        "backend: engine executable not found at {path}; set `engine_executable` in the settings file or BUILDGATE_ENGINE_EXECUTABLE"
    )]
    EngineMissing { path: Utf8PathBuf },

    #[error("resolver: failed to create output directory {path}")]
    OutputDirectory {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    /// Whether `build-all` may skip this error with a warning
    pub fn is_skippable(&self) -> bool {
        matches!(self, BuildError::PlatformUnavailable { .. })
    }

    /// Whether the error came from the release validation gate
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            BuildError::ConfigurationMissing { .. } | BuildError::ConfigurationNotReady { .. }
        )
    }
}
