use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Platform an artifact is produced for.
///
/// Each variant maps to exactly one artifact format, so "Android APK" and
/// "Android App Bundle" are separate targets rather than one platform with a
/// packaging switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildTarget {
    AndroidApk,
    AndroidAab,
    IosProject,
}

impl BuildTarget {
    /// All targets in the order `build-all` runs them.
    pub const ALL: [BuildTarget; 3] = [
        BuildTarget::AndroidApk,
        BuildTarget::AndroidAab,
        BuildTarget::IosProject,
    ];

    /// Platform name used as the artifact file stem
    pub fn platform_name(self) -> &'static str {
        match self {
            BuildTarget::AndroidApk | BuildTarget::AndroidAab => "android",
            BuildTarget::IosProject => "ios",
        }
    }

    /// Artifact extension, `None` for directory outputs
    pub fn extension(self) -> Option<&'static str> {
        match self {
            BuildTarget::AndroidApk => Some("apk"),
            BuildTarget::AndroidAab => Some("aab"),
            BuildTarget::IosProject => None,
        }
    }

    /// Build target name understood by the engine's `-buildTarget` switch
    pub fn engine_target(self) -> &'static str {
        match self {
            BuildTarget::AndroidApk | BuildTarget::AndroidAab => "Android",
            BuildTarget::IosProject => "iOS",
        }
    }

    /// Whether the artifact is a directory (an exported project) instead of a file
    pub fn produces_directory(self) -> bool {
        self.extension().is_none()
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildTarget::AndroidApk => "Android APK",
            BuildTarget::AndroidAab => "Android App Bundle",
            BuildTarget::IosProject => "iOS project",
        };
        f.write_str(name)
    }
}

/// Development or release build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    Development,
    Release,
}

impl BuildMode {
    /// Suffix appended to the platform name in the artifact file name
    pub fn suffix(self) -> &'static str {
        match self {
            BuildMode::Development => "debug",
            BuildMode::Release => "release",
        }
    }

    pub fn is_release(self) -> bool {
        self == BuildMode::Release
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildMode::Development => f.write_str("development"),
            BuildMode::Release => f.write_str("release"),
        }
    }
}

/// What the caller asked to build.
///
/// Android and iOS decide "development or not" on separate axes:
/// - `packaging_mode` drives the Android artifact format and its toggles
/// - `debugging_enabled` drives the iOS project export's debugging support
///
/// The resolver joins the two only when composing platform options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildIntent {
    pub target: BuildTarget,
    pub packaging_mode: BuildMode,
    pub debugging_enabled: bool,
}

impl BuildIntent {
    /// Development APK for side-loading onto test devices
    pub fn android_apk() -> Self {
        Self {
            target: BuildTarget::AndroidApk,
            packaging_mode: BuildMode::Development,
            debugging_enabled: true,
        }
    }

    /// Release App Bundle for store upload
    pub fn android_aab() -> Self {
        Self {
            target: BuildTarget::AndroidAab,
            packaging_mode: BuildMode::Release,
            debugging_enabled: false,
        }
    }

    /// iOS project export; `debugging_enabled` comes from the `-development` flag
    pub fn ios(debugging_enabled: bool) -> Self {
        Self {
            target: BuildTarget::IosProject,
            packaging_mode: BuildMode::Release,
            debugging_enabled,
        }
    }

    /// Intent for a target using the target's default axes
    pub fn for_target(target: BuildTarget, ios_debugging: bool) -> Self {
        match target {
            BuildTarget::AndroidApk => Self::android_apk(),
            BuildTarget::AndroidAab => Self::android_aab(),
            BuildTarget::IosProject => Self::ios(ios_debugging),
        }
    }

    /// The mode the build is validated and named under.
    ///
    /// Android follows `packaging_mode`; iOS follows `debugging_enabled`.
    pub fn effective_mode(&self) -> BuildMode {
        match self.target {
            BuildTarget::AndroidApk | BuildTarget::AndroidAab => self.packaging_mode,
            BuildTarget::IosProject => {
                if self.debugging_enabled {
                    BuildMode::Development
                } else {
                    BuildMode::Release
                }
            }
        }
    }
}

/// CPU architectures packaged into an Android artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AndroidArchitecture {
    #[serde(rename = "ARM64")]
    Arm64,
}

impl AndroidArchitecture {
    pub fn as_str(self) -> &'static str {
        match self {
            AndroidArchitecture::Arm64 => "ARM64",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScriptingBackend {
    #[serde(rename = "IL2CPP")]
    Il2Cpp,
}

impl ScriptingBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            ScriptingBackend::Il2Cpp => "IL2CPP",
        }
    }
}

/// How much native debug symbol data the engine generates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPolicy {
    /// Nothing beyond what the toolchain emits by default
    Minimal,
    /// Public symbol files suitable for store crash symbolication
    Public,
}

impl SymbolPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolPolicy::Minimal => "minimal",
            SymbolPolicy::Public => "public",
        }
    }
}

/// Debugging support baked into the artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DebugToggles {
    pub development_build: bool,
    pub allow_debugging: bool,
    pub connect_profiler: bool,
}

impl DebugToggles {
    pub fn enabled() -> Self {
        Self {
            development_build: true,
            allow_debugging: true,
            connect_profiler: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            development_build: false,
            allow_debugging: false,
            connect_profiler: false,
        }
    }

    pub fn any_enabled(&self) -> bool {
        self.development_build || self.allow_debugging || self.connect_profiler
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AndroidOptions {
    pub app_bundle: bool,
    pub architectures: Vec<AndroidArchitecture>,
    pub min_sdk_version: u32,
    pub scripting_backend: ScriptingBackend,
    pub symbols: SymbolPolicy,
    pub debug: DebugToggles,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IosOptions {
    /// iOS output is always an exported project, never an in-place binary
    pub export_project: bool,
    pub min_os_version: String,
    pub scripting_backend: ScriptingBackend,
    pub debug: DebugToggles,
}

/// Platform-specific packaging toggles
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "platform", rename_all = "snake_case")]
pub enum PlatformOptions {
    Android(AndroidOptions),
    Ios(IosOptions),
}

impl PlatformOptions {
    pub fn debug(&self) -> &DebugToggles {
        match self {
            PlatformOptions::Android(options) => &options.debug,
            PlatformOptions::Ios(options) => &options.debug,
        }
    }
}

/// One concrete build request.
///
/// Produced by [`crate::services::BuildResolver`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfiguration {
    target: BuildTarget,
    mode: BuildMode,
    scenes: Vec<String>,
    output_path: Utf8PathBuf,
    platform_options: PlatformOptions,
}

impl BuildConfiguration {
    pub(crate) fn new(
        target: BuildTarget,
        mode: BuildMode,
        scenes: Vec<String>,
        output_path: Utf8PathBuf,
        platform_options: PlatformOptions,
    ) -> Self {
        Self {
            target,
            mode,
            scenes,
            output_path,
            platform_options,
        }
    }

    pub fn target(&self) -> BuildTarget {
        self.target
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn scenes(&self) -> &[String] {
        &self.scenes
    }

    pub fn output_path(&self) -> &Utf8Path {
        &self.output_path
    }

    pub fn platform_options(&self) -> &PlatformOptions {
        &self.platform_options
    }

    /// Whether any debugging toggle is on
    pub fn debugging_enabled(&self) -> bool {
        self.platform_options.debug().any_enabled()
    }

    /// Flatten the typed options into the engine's key/value option bag.
    ///
    /// Keys are emitted in a fixed order.
    pub fn option_bag(&self) -> IndexMap<String, String> {
        let mut bag = IndexMap::new();

        match &self.platform_options {
            PlatformOptions::Android(android) => {
                bag.insert("buildAppBundle".to_string(), android.app_bundle.to_string());
                let architectures: Vec<&str> =
                    android.architectures.iter().map(|a| a.as_str()).collect();
                bag.insert("targetArchitectures".to_string(), architectures.join(","));
                bag.insert(
                    "minSdkVersion".to_string(),
                    android.min_sdk_version.to_string(),
                );
                bag.insert(
                    "scriptingBackend".to_string(),
                    android.scripting_backend.as_str().to_string(),
                );
                bag.insert("createSymbols".to_string(), android.symbols.as_str().to_string());
            }
            PlatformOptions::Ios(ios) => {
                bag.insert("exportProject".to_string(), ios.export_project.to_string());
                bag.insert("minOsVersion".to_string(), ios.min_os_version.clone());
                bag.insert(
                    "scriptingBackend".to_string(),
                    ios.scripting_backend.as_str().to_string(),
                );
            }
        }

        let debug = self.platform_options.debug();
        bag.insert("development".to_string(), debug.development_build.to_string());
        bag.insert("allowDebugging".to_string(), debug.allow_debugging.to_string());
        bag.insert("connectProfiler".to_string(), debug.connect_profiler.to_string());

        bag
    }
}
