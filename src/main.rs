//! buildgate - command line entry point.
//!
//! # Execution Flow
//!
//! 1. Parse arguments (`-development` is accepted as well as `--development`)
//! 2. Load settings from `buildgate.yaml` and `BUILDGATE_*` variables
//! 3. Initialize logging → `<log_dir>/buildgate.<date>`
//! 4. Run the requested pipeline(s) on a single-threaded tokio runtime
//! 5. Log the build summary and exit with 0 on success, 1 otherwise
//!
//! # Commands
//!
//! - `build-android-apk` / `buildAndroidApk`: development APK
//! - `build-android-aab` / `buildAndroidAab`: release App Bundle
//! - `build-ios` / `buildIos [-development]`: iOS project export
//! - `build-all` / `buildAll [-development]`: all of the above, host permitting
//! - `plan <target>`: print the resolved configuration as YAML

use anyhow::{Context, Result};
use buildgate::cli::{Cli, Cmd, normalize_args};
use buildgate::services::EngineBackend;
use buildgate::{APP_NAME, Orchestrator, VERSION};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let mut settings = buildgate::config::load_settings(cli.settings.as_deref())?;
    settings.debug |= cli.debug;

    let _guard = buildgate::logging::setup_logging_with_console(
        &settings.log_dir,
        "buildgate",
        settings.debug,
        !cli.quiet,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    tracing::info!(
        "Loaded settings: project={}, engine={}, output={}",
        settings.project_path,
        settings.engine_executable,
        settings.resolved_output_root()
    );

    let backend = EngineBackend::from_settings(&settings)?;
    let orchestrator = Orchestrator::from_settings(backend, &settings);

    if let Cmd::Plan { .. } = cli.cmd {
        if let Some(intent) = cli.cmd.intent() {
            let configuration = orchestrator.plan(&intent);
            let yaml = serde_yaml_ng::to_string(&configuration)
                .context("Failed to serialize build configuration")?;
            print!("{}", yaml);
        }
        return Ok(0);
    }

    // One pipeline at a time on the current thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let (exit_code, summaries) = runtime.block_on(async {
        match cli.cmd {
            Cmd::BuildAll { development } => {
                let report = orchestrator.run_all(development).await;
                let summaries: Vec<String> =
                    report.outcomes().iter().map(|o| o.summary()).collect();
                (report.exit_code(), summaries)
            }
            ref cmd => match cmd.intent() {
                Some(intent) => {
                    let outcome = orchestrator.run(&intent).await;
                    (outcome.exit_code(), vec![outcome.summary()])
                }
                None => (0, Vec::new()),
            },
        }
    });

    // Outcomes reach the terminal even with --quiet
    for summary in &summaries {
        eprintln!("{}", summary);
    }

    orchestrator.metrics().log_summary();
    tracing::info!("Exiting with status {}", exit_code);

    Ok(u8::try_from(exit_code).unwrap_or(1))
}
