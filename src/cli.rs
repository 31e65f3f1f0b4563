use crate::models::{BuildIntent, BuildTarget};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::{OsStr, OsString};

/// Engine-style spelling of the iOS debugging flag
const ENGINE_DEVELOPMENT_FLAG: &str = "-development";

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    #[value(name = "android-apk")]
    AndroidApk,
    #[value(name = "android-aab")]
    AndroidAab,
    #[value(name = "ios")]
    Ios,
}

impl From<TargetArg> for BuildTarget {
    fn from(value: TargetArg) -> Self {
        match value {
            TargetArg::AndroidApk => BuildTarget::AndroidApk,
            TargetArg::AndroidAab => BuildTarget::AndroidAab,
            TargetArg::Ios => BuildTarget::IosProject,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "buildgate")]
#[command(version, about = "Build the application for Android and iOS, refusing unsafe release builds")]
pub struct Cli {
    /// Settings file (defaults to ./buildgate.yaml when present)
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub settings: Option<Utf8PathBuf>,

    /// Verbose logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Log to files only; build outcomes are still printed to stderr
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Cmd {
    /// Development APK with debugging and profiler support.
    #[command(alias = "buildAndroidApk")]
    BuildAndroidApk,

    /// Release App Bundle for store upload. Requires a release-ready configuration.
    #[command(alias = "buildAndroidAab")]
    BuildAndroidAab,

    /// Export the iOS project. Without `-development` this is a release export.
    #[command(alias = "buildIos")]
    BuildIos {
        /// Enable debugging support in the exported project
        #[arg(long)]
        development: bool,
    },

    /// Build every target, skipping targets this host can't produce.
    #[command(alias = "buildAll")]
    BuildAll {
        /// Enable debugging support in the iOS export
        #[arg(long)]
        development: bool,
    },

    /// Print the resolved build configuration without building.
    Plan {
        #[arg(value_enum)]
        target: TargetArg,

        /// Resolve the iOS export with debugging support
        #[arg(long)]
        development: bool,
    },
}

impl Cmd {
    /// The single intent this command builds, `None` for `build-all`
    pub fn intent(&self) -> Option<BuildIntent> {
        match self {
            Cmd::BuildAndroidApk => Some(BuildIntent::android_apk()),
            Cmd::BuildAndroidAab => Some(BuildIntent::android_aab()),
            Cmd::BuildIos { development } => Some(BuildIntent::ios(*development)),
            Cmd::Plan {
                target,
                development,
            } => Some(BuildIntent::for_target((*target).into(), *development)),
            Cmd::BuildAll { .. } => None,
        }
    }
}

/// Options that consume the following argument as their value
const VALUE_OPTIONS: [&str; 1] = ["--settings"];

/// Accept the engine's single-dash `-development` alongside `--development`.
///
/// Only flag positions are rewritten; the value of an option such as
/// `--settings` is passed through untouched.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut normalized: Vec<OsString> = Vec::new();

    for arg in args {
        let is_value = normalized.last().is_some_and(|prev| {
            VALUE_OPTIONS
                .iter()
                .any(|opt| prev.as_os_str() == OsStr::new(opt))
        });

        if !is_value && arg.as_os_str() == OsStr::new(ENGINE_DEVELOPMENT_FLAG) {
            normalized.push(OsString::from("--development"));
        } else {
            normalized.push(arg);
        }
    }

    normalized
}
