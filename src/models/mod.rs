//! Data models for buildgate.
//!
//! - [`BuildIntent`]: What the caller asked to build (target plus the Android and iOS mode axes)
//! - [`BuildConfiguration`]: The fully resolved, read-only build request handed to the backend
//! - [`BuildResult`]: Normalized outcome of one backend invocation
//! - [`ApplicationConfig`]: The application's operational configuration, read through [`ReleaseReadiness`]
//! - [`OrchestratorSettings`]: Where the project, engine and output directories live

pub mod build;
pub mod config;
pub mod result;

pub use build::{
    AndroidArchitecture, AndroidOptions, BuildConfiguration, BuildIntent, BuildMode, BuildTarget,
    DebugToggles, IosOptions, PlatformOptions, ScriptingBackend, SymbolPolicy,
};
pub use config::{ApplicationConfig, OrchestratorSettings, PLACEHOLDER_ENDPOINT, ReleaseReadiness};
pub use result::{BuildResult, BuildStatus, format_size};
