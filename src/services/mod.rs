//! Services module - the build pipeline stages.
//!
//! Each stage is usable on its own and has no dependency on the command line
//! surface or on process-wide state.
//!
//! # Components
//!
//! - [`BuildResolver`]: Composes a [`BuildConfiguration`](crate::models::BuildConfiguration)
//!   from a [`BuildIntent`](crate::models::BuildIntent):
//!   - Fixed scene manifest shared by every target
//!   - Deterministic output path per target and mode
//!   - Android options follow the packaging mode, iOS options follow the debugging flag
//!
//! - [`ValidationGate`]: Decides whether a build may proceed. Development builds always
//!   pass; release builds need a loadable configuration whose readiness flag is true.
//!
//! - [`BuildBackend`]: Seam to the external build engine. [`EngineBackend`] runs the
//!   engine in batch mode and normalizes exit code, build report and log into a
//!   [`BuildResult`](crate::models::BuildResult).
//!
//! # Engine Integration
//!
//! For every build the engine backend:
//! 1. Clears the previous report and log for that artifact
//! 2. Writes a YAML build request next to the artifact
//! 3. Runs the engine with `-batchmode -nographics -quit` and the request/report/log paths
//! 4. Reads the YAML build report, falling back to counting errors in the engine log

pub mod backend;
pub mod resolver;
pub mod validation;

pub use backend::{BuildBackend, EngineBackend, EngineFiles, EngineReport, HostPlatform};
pub use resolver::{BuildResolver, SCENE_MANIFEST};
pub use validation::{DenyReason, ValidationDecision, ValidationGate};
