// buildgate - Multi-target build orchestrator with a release configuration gate
//
// This is the library crate containing the pipeline stages and data structures.
// The binary crate (main.rs) provides the command line entry point.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod services;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use error::BuildError;
pub use models::{
    ApplicationConfig, BuildConfiguration, BuildIntent, BuildMode, BuildResult, BuildStatus,
    BuildTarget, OrchestratorSettings, ReleaseReadiness,
};
pub use orchestrator::{BatchReport, Orchestrator, PipelineOutcome};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
