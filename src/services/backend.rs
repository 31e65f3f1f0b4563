use crate::error::BuildError;
use crate::models::{BuildConfiguration, BuildResult, BuildTarget, OrchestratorSettings};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Instant;
use tokio::process::Command;

/// Invokes the external build engine.
///
/// Implementations translate nothing: option composition already happened in
/// the resolver. They run the build and normalize whatever came back into a
/// [`BuildResult`], without retrying and without interpreting failure causes.
#[cfg_attr(test, mockall::automock)]
#[allow(async_fn_in_trait)]
pub trait BuildBackend {
    /// Whether `target` can be built on this host at all
    fn check_available(&self, target: BuildTarget) -> Result<(), BuildError>;

    /// Run one build to completion. Never cancelled once started.
    async fn build(&self, configuration: &BuildConfiguration) -> BuildResult;
}

/// Operating system the orchestrator runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    MacOs,
    Windows,
    Linux,
    Other,
}

impl HostPlatform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            HostPlatform::MacOs
        } else if cfg!(target_os = "windows") {
            HostPlatform::Windows
        } else if cfg!(target_os = "linux") {
            HostPlatform::Linux
        } else {
            HostPlatform::Other
        }
    }
}

/// Status line of an engine build report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Succeeded,
    Failed,
}

/// Build report the engine writes to the `-buildReport` path
#[derive(Debug, Clone, Deserialize)]
pub struct EngineReport {
    pub status: ReportStatus,
    #[serde(default)]
    pub errors: u32,
    #[serde(default)]
    pub total_size: u64,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Build request handed to the engine through `-buildRequest`
#[derive(Debug, Serialize)]
struct EngineRequest<'a> {
    target: &'a str,
    mode: String,
    scenes: &'a [String],
    output_path: &'a Utf8Path,
    options: IndexMap<String, String>,
}

/// Files exchanged with the engine for one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFiles {
    pub request: Utf8PathBuf,
    pub report: Utf8PathBuf,
    pub log: Utf8PathBuf,
}

impl EngineFiles {
    /// Request and report sit next to the artifact; the log goes to `log_dir`
    pub fn for_configuration(configuration: &BuildConfiguration, log_dir: &Utf8Path) -> Self {
        let output = configuration.output_path();
        let name = output.file_name().unwrap_or("build");

        Self {
            request: Utf8PathBuf::from(format!("{}.request.yaml", output)),
            report: Utf8PathBuf::from(format!("{}.report.yaml", output)),
            log: log_dir.join(format!("{}.log", name)),
        }
    }
}

/// Runs the engine in batch mode as a subprocess.
///
/// # Fields
///
/// - `compiler_error_pattern`: script compiler diagnostics, e.g.
///   `Assets/Player.cs(10,5): error CS0103: The name 'x' does not exist`
/// - `build_error_pattern`: player build failures, e.g. `Error building Player: ...`
///
/// Both are only used to count errors in the engine log when the engine
/// died before writing its report.
pub struct EngineBackend {
    engine_executable: Utf8PathBuf,
    project_path: Utf8PathBuf,
    log_dir: Utf8PathBuf,
    host: HostPlatform,
    compiler_error_pattern: Regex,
    build_error_pattern: Regex,
}

impl EngineBackend {
    pub fn new(
        engine_executable: impl Into<Utf8PathBuf>,
        project_path: impl Into<Utf8PathBuf>,
        log_dir: impl Into<Utf8PathBuf>,
    ) -> Result<Self> {
        Ok(Self {
            engine_executable: engine_executable.into(),
            project_path: project_path.into(),
            log_dir: log_dir.into(),
            host: HostPlatform::current(),
            compiler_error_pattern: Regex::new(r"error CS\d+")
                .context("Invalid compiler error regex")?,
            build_error_pattern: Regex::new(
                r"(?i)^\s*(error building player|buildfailedexception|build failed)",
            )
            .context("Invalid build error regex")?,
        })
    }

    pub fn from_settings(settings: &OrchestratorSettings) -> Result<Self> {
        Self::new(
            settings.engine_executable.clone(),
            settings.project_path.clone(),
            settings.engine_log_dir.clone(),
        )
    }

    /// Override the detected host platform
    pub fn with_host(mut self, host: HostPlatform) -> Self {
        self.host = host;
        self
    }

    /// Command-line arguments for one engine run
    pub fn build_command_args(
        &self,
        configuration: &BuildConfiguration,
        files: &EngineFiles,
    ) -> Vec<String> {
        vec![
            "-batchmode".to_string(),
            "-nographics".to_string(),
            "-quit".to_string(),
            "-projectPath".to_string(),
            self.project_path.to_string(),
            "-buildTarget".to_string(),
            configuration.target().engine_target().to_string(),
            "-buildRequest".to_string(),
            files.request.to_string(),
            "-buildReport".to_string(),
            files.report.to_string(),
            "-logFile".to_string(),
            files.log.to_string(),
        ]
    }

    /// Write the request document for the engine
    pub fn write_request(&self, configuration: &BuildConfiguration, path: &Utf8Path) -> Result<()> {
        let request = EngineRequest {
            target: configuration.target().engine_target(),
            mode: configuration.mode().to_string(),
            scenes: configuration.scenes(),
            output_path: configuration.output_path(),
            options: configuration.option_bag(),
        };

        let yaml = serde_yaml_ng::to_string(&request)
            .context("Failed to serialize build request to YAML")?;
        fs::write(path, yaml).with_context(|| format!("Failed to write build request: {}", path))?;

        tracing::debug!("Wrote build request: {}", path);
        Ok(())
    }

    /// Remove the report and log left over from a previous run
    pub fn clear_previous_run(&self, files: &EngineFiles) -> Result<()> {
        for path in [&files.report, &files.log] {
            if path.exists() {
                fs::remove_file(path)
                    .with_context(|| format!("Failed to remove stale file: {}", path))?;
                tracing::debug!("Cleared {}", path);
            }
        }
        Ok(())
    }

    /// Read the engine's report. A missing or unreadable report yields `None`.
    pub fn read_report(&self, path: &Utf8Path) -> Option<EngineReport> {
        if !path.exists() {
            return None;
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_yaml_ng::from_str(&content) {
                Ok(report) => Some(report),
                Err(e) => {
                    tracing::warn!("Failed to parse build report {}: {}", path, e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read build report {}: {}", path, e);
                None
            }
        }
    }

    /// Count error lines in the engine log. A missing log counts as zero.
    pub fn count_log_errors(&self, log: &Utf8Path) -> Result<u32> {
        if !log.exists() {
            return Ok(0);
        }

        let content = fs::read_to_string(log)
            .with_context(|| format!("Failed to read engine log: {}", log))?;

        let count = content
            .lines()
            .filter(|line| {
                self.compiler_error_pattern.is_match(line) || self.build_error_pattern.is_match(line)
            })
            .count();

        tracing::debug!("Engine log {} contains {} error line(s)", log, count);
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    /// Map the engine's exit code and report onto a [`BuildResult`].
    ///
    /// Only a zero exit code together with a `succeeded` report counts as
    /// success. A crash, a non-zero exit, a missing report and a reported
    /// failure all become `Failed`.
    pub fn interpret(
        &self,
        configuration: &BuildConfiguration,
        exit_code: i32,
        files: &EngineFiles,
    ) -> BuildResult {
        let report = self.read_report(&files.report);
        let log_errors = || match self.count_log_errors(&files.log) {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!("{:#}", e);
                0
            }
        };

        match report {
            Some(report) if exit_code == 0 && report.status == ReportStatus::Succeeded => {
                let output = configuration.output_path();
                let size = if report.total_size > 0 {
                    report.total_size
                } else {
                    artifact_size(output).unwrap_or_else(|e| {
                        tracing::warn!("Could not measure artifact {}: {:#}", output, e);
                        0
                    })
                };
                BuildResult::succeeded(output.to_path_buf(), size)
            }
            Some(report) if report.status == ReportStatus::Failed => {
                let errors = if report.errors > 0 {
                    report.errors
                } else {
                    log_errors()
                };
                let message = report
                    .summary
                    .unwrap_or_else(|| "engine reported a failed build".to_string());
                BuildResult::failed(errors, message)
            }
            Some(_) => BuildResult::failed(
                log_errors(),
                format!("engine exited with code {} after reporting success", exit_code),
            ),
            None if exit_code == 0 => {
                BuildResult::failed(log_errors(), "engine exited without writing a build report")
            }
            None => BuildResult::failed(
                log_errors(),
                format!("engine exited with code {}", exit_code),
            ),
        }
    }

    async fn run_engine(&self, configuration: &BuildConfiguration) -> Result<BuildResult> {
        fs::create_dir_all(&self.log_dir)
            .with_context(|| format!("Failed to create engine log directory: {}", self.log_dir))?;

        let files = EngineFiles::for_configuration(configuration, &self.log_dir);
        self.clear_previous_run(&files)?;
        self.write_request(configuration, &files.request)?;

        let args = self.build_command_args(configuration, &files);
        tracing::info!("Executing: {} {}", self.engine_executable, args.join(" "));

        let status = Command::new(&self.engine_executable)
            .args(&args)
            .status()
            .await
            .with_context(|| format!("Failed to spawn engine: {}", self.engine_executable))?;

        let exit_code = status.code().unwrap_or(-1);
        tracing::info!("Engine exited with code {}", exit_code);

        Ok(self.interpret(configuration, exit_code, &files))
    }
}

impl BuildBackend for EngineBackend {
    fn check_available(&self, target: BuildTarget) -> Result<(), BuildError> {
        if target == BuildTarget::IosProject && self.host != HostPlatform::MacOs {
            return Err(BuildError::PlatformUnavailable {
                target,
                reason: "iOS project export requires a macOS host".to_string(),
            });
        }

        // A bare executable name is resolved through PATH at spawn time
        let is_bare_name = self.engine_executable.components().count() == 1;
        if !is_bare_name && !self.engine_executable.exists() {
            return Err(BuildError::EngineMissing {
                path: self.engine_executable.clone(),
            });
        }

        Ok(())
    }

    async fn build(&self, configuration: &BuildConfiguration) -> BuildResult {
        let start = Instant::now();

        let result = match self.run_engine(configuration).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Engine invocation failed: {:#}", e);
                BuildResult::failed(1, format!("{:#}", e))
            }
        };

        tracing::info!(
            "{} build finished in {:.2}s",
            configuration.target(),
            start.elapsed().as_secs_f32()
        );

        result.with_duration(start.elapsed())
    }
}

/// Size of a file, or the total size of all files under a directory.
///
/// Symbolic links are not followed and count as zero.
pub fn artifact_size(path: &Utf8Path) -> Result<u64> {
    let metadata = fs::symlink_metadata(path)
        .with_context(|| format!("Failed to stat artifact: {}", path))?;

    if metadata.file_type().is_symlink() {
        tracing::debug!("Not following symlink in artifact: {}", path);
        return Ok(0);
    }

    if metadata.is_file() {
        return Ok(metadata.len());
    }

    let mut total = 0;
    for entry in
        fs::read_dir(path).with_context(|| format!("Failed to read artifact directory: {}", path))?
    {
        let entry = entry?;
        let child = Utf8PathBuf::try_from(entry.path())
            .with_context(|| format!("Non UTF-8 path under {}", path))?;
        total += artifact_size(&child)?;
    }
    Ok(total)
}
