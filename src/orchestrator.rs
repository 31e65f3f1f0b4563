// Build orchestrator
//
// Sequences resolve -> host check -> release gate -> backend -> report for one
// target, and runs every target independently for `build-all`.

use crate::config::ConfigManager;
use crate::error::BuildError;
use crate::metrics::Metrics;
use crate::models::{
    BuildConfiguration, BuildIntent, BuildMode, BuildResult, BuildTarget, OrchestratorSettings,
    format_size,
};
use crate::services::{BuildBackend, BuildResolver, ValidationGate};

/// Final state of one pipeline
#[derive(Debug)]
pub struct PipelineOutcome {
    target: BuildTarget,
    mode: BuildMode,
    result: Result<BuildResult, BuildError>,
}

impl PipelineOutcome {
    pub fn target(&self) -> BuildTarget {
        self.target
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn result(&self) -> &Result<BuildResult, BuildError> {
        &self.result
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Whether the pipeline was skipped because the host can't build the target
    pub fn is_skipped(&self) -> bool {
        matches!(&self.result, Err(e) if e.is_skippable())
    }

    /// Process exit code when this pipeline is the only one run
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }

    /// One-line outcome for the operator's terminal
    pub fn summary(&self) -> String {
        match &self.result {
            Ok(build) => format!(
                "{} ({}): built {} ({})",
                self.target,
                self.mode,
                build.artifact_path().map(|p| p.as_str()).unwrap_or_default(),
                format_size(build.artifact_size_bytes())
            ),
            Err(e) if e.is_skippable() => {
                format!("{} ({}): unavailable, {}", self.target, self.mode, e)
            }
            Err(e) => format!("{} ({}): {}", self.target, self.mode, e),
        }
    }
}

/// Outcomes of a `build-all` run, in execution order
#[derive(Debug, Default)]
pub struct BatchReport {
    outcomes: Vec<PipelineOutcome>,
}

impl BatchReport {
    pub fn outcomes(&self) -> &[PipelineOutcome] {
        &self.outcomes
    }

    pub fn outcome(&self, target: BuildTarget) -> Option<&PipelineOutcome> {
        self.outcomes.iter().find(|o| o.target == target)
    }

    /// Pipelines that failed for a reason other than host capability
    pub fn failures(&self) -> impl Iterator<Item = &PipelineOutcome> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_success() && !o.is_skipped())
    }

    /// `1` if any pipeline was denied or failed; skipped targets don't count
    pub fn exit_code(&self) -> i32 {
        if self.failures().next().is_some() { 1 } else { 0 }
    }
}

/// Drives build pipelines one at a time.
///
/// # Pipeline
///
/// 1. Resolve the intent into a [`BuildConfiguration`]
/// 2. Ask the backend whether the host can build the target at all
/// 3. For release builds, load the application config and run the [`ValidationGate`]
/// 4. Create the output directory
/// 5. Invoke the backend and interpret its [`BuildResult`]
///
/// A denial at step 3 ends the pipeline before the backend is touched.
pub struct Orchestrator<B: BuildBackend> {
    backend: B,
    resolver: BuildResolver,
    config_manager: ConfigManager,
    gate: ValidationGate,
    metrics: Metrics,
}

impl<B: BuildBackend> Orchestrator<B> {
    pub fn new(backend: B, resolver: BuildResolver, config_manager: ConfigManager) -> Self {
        let gate = ValidationGate::new(config_manager.app_config_path());
        Self {
            backend,
            resolver,
            config_manager,
            gate,
            metrics: Metrics::new(),
        }
    }

    pub fn from_settings(backend: B, settings: &OrchestratorSettings) -> Self {
        Self::new(
            backend,
            BuildResolver::new(settings.resolved_output_root()),
            ConfigManager::from_settings(settings),
        )
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Resolve an intent without building anything
    pub fn plan(&self, intent: &BuildIntent) -> BuildConfiguration {
        self.resolver.resolve(intent)
    }

    /// Run a single pipeline. A host that can't build the target is a failure.
    pub async fn run(&self, intent: &BuildIntent) -> PipelineOutcome {
        let outcome = self.run_pipeline(intent).await;
        self.report(&outcome, false);
        outcome
    }

    /// Run every target in turn.
    ///
    /// Targets the host can't build are skipped with a warning. A denied or
    /// failed target is reported and the remaining targets still run.
    pub async fn run_all(&self, ios_debugging: bool) -> BatchReport {
        let mut report = BatchReport::default();

        for target in BuildTarget::ALL {
            let intent = BuildIntent::for_target(target, ios_debugging);
            let outcome = self.run_pipeline(&intent).await;
            self.report(&outcome, true);
            report.outcomes.push(outcome);
        }

        let failed: Vec<String> = report.failures().map(|o| o.target.to_string()).collect();
        if failed.is_empty() {
            tracing::info!("All buildable targets succeeded");
        } else {
            tracing::error!("Failed targets: {}", failed.join(", "));
        }

        report
    }

    async fn run_pipeline(&self, intent: &BuildIntent) -> PipelineOutcome {
        let configuration = self.resolver.resolve(intent);
        let result = self.execute(&configuration).await;
        self.record(&result);

        PipelineOutcome {
            target: configuration.target(),
            mode: configuration.mode(),
            result,
        }
    }

    async fn execute(&self, configuration: &BuildConfiguration) -> Result<BuildResult, BuildError> {
        let target = configuration.target();
        tracing::info!(
            "Building {} ({}) -> {}",
            target,
            configuration.mode(),
            configuration.output_path()
        );

        self.backend.check_available(target)?;
        self.validate(configuration.mode())?;
        self.resolver.prepare_output_dir(configuration)?;

        let result = self.backend.build(configuration).await;
        self.metrics.record_build_time(result.duration());

        if result.is_success() {
            Ok(result)
        } else {
            Err(BuildError::BackendFailure {
                target,
                error_count: result.error_count(),
                message: result
                    .message()
                    .unwrap_or("engine reported a failed build")
                    .to_string(),
            })
        }
    }

    /// Release builds load the application config and must pass the gate.
    /// Development builds never touch the config.
    fn validate(&self, mode: BuildMode) -> Result<(), BuildError> {
        let config = if mode.is_release() {
            match self.config_manager.load_application_config() {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!("{:#}", e);
                    None
                }
            }
        } else {
            None
        };

        self.gate.evaluate(mode, config.as_ref()).into_result()
    }

    fn record(&self, result: &Result<BuildResult, BuildError>) {
        match result {
            Ok(build) => self.metrics.record_build_succeeded(build.artifact_size_bytes()),
            Err(e) if e.is_denial() => self.metrics.record_build_denied(),
            Err(e) if e.is_skippable() => self.metrics.record_build_skipped(),
            Err(_) => self.metrics.record_build_failed(),
        }
    }

    fn report(&self, outcome: &PipelineOutcome, in_batch: bool) {
        match &outcome.result {
            Ok(build) => tracing::info!(
                "{} build succeeded: {} ({})",
                outcome.target,
                build.artifact_path().map(|p| p.as_str()).unwrap_or_default(),
                format_size(build.artifact_size_bytes())
            ),
            Err(e) if in_batch && e.is_skippable() => {
                tracing::warn!("Skipping {}: {}", outcome.target, e)
            }
            Err(e) => tracing::error!("{} build aborted: {}", outcome.target, e),
        }
    }
}
