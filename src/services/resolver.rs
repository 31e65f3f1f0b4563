use crate::error::BuildError;
use crate::models::{
    AndroidArchitecture, AndroidOptions, BuildConfiguration, BuildIntent, BuildMode, BuildTarget,
    DebugToggles, IosOptions, PlatformOptions, ScriptingBackend, SymbolPolicy,
};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Scenes packaged into every artifact, in boot order.
///
/// Shared by all targets: content changes are made here once.
pub const SCENE_MANIFEST: [&str; 4] = [
    "Assets/Scenes/Bootstrap.unity",
    "Assets/Scenes/MainMenu.unity",
    "Assets/Scenes/Gameplay.unity",
    "Assets/Scenes/Results.unity",
];

/// Lowest Android API level the artifacts support
pub const ANDROID_MIN_SDK_VERSION: u32 = 24;

/// Lowest iOS version the exported project targets
pub const IOS_MIN_OS_VERSION: &str = "13.0";

/// Turns a [`BuildIntent`] into a [`BuildConfiguration`].
///
/// Resolution is a pure function of the intent and the output root: the
/// resolver never reads process arguments, the clock or the filesystem.
/// [`BuildResolver::prepare_output_dir`] is its only side effect.
#[derive(Debug, Clone)]
pub struct BuildResolver {
    output_root: Utf8PathBuf,
}

impl BuildResolver {
    pub fn new<P: AsRef<Utf8Path>>(output_root: P) -> Self {
        Self {
            output_root: output_root.as_ref().to_path_buf(),
        }
    }

    pub fn output_root(&self) -> &Utf8Path {
        &self.output_root
    }

    /// Compose the configuration for an intent
    pub fn resolve(&self, intent: &BuildIntent) -> BuildConfiguration {
        let mode = intent.effective_mode();
        let platform_options = match intent.target {
            BuildTarget::AndroidApk | BuildTarget::AndroidAab => {
                PlatformOptions::Android(android_options(intent.target, intent.packaging_mode))
            }
            BuildTarget::IosProject => PlatformOptions::Ios(ios_options(intent.debugging_enabled)),
        };

        let configuration = BuildConfiguration::new(
            intent.target,
            mode,
            SCENE_MANIFEST.iter().map(|s| s.to_string()).collect(),
            self.output_path(intent.target, mode),
            platform_options,
        );

        tracing::debug!(
            "Resolved {} ({}) -> {}",
            intent.target,
            mode,
            configuration.output_path()
        );

        configuration
    }

    /// `<output-root>/<platform-name>-<mode-suffix>[.<ext>]`
    ///
    /// Repeated builds of the same target and mode land on the same path.
    pub fn output_path(&self, target: BuildTarget, mode: BuildMode) -> Utf8PathBuf {
        let stem = format!("{}-{}", target.platform_name(), mode.suffix());
        match target.extension() {
            Some(ext) => self.output_root.join(format!("{}.{}", stem, ext)),
            None => self.output_root.join(stem),
        }
    }

    /// Create the directory the artifact is written into. Safe to repeat.
    pub fn prepare_output_dir(&self, configuration: &BuildConfiguration) -> Result<(), BuildError> {
        let dir = configuration
            .output_path()
            .parent()
            .unwrap_or(self.output_root.as_path());

        fs::create_dir_all(dir).map_err(|source| BuildError::OutputDirectory {
            path: dir.to_path_buf(),
            source,
        })?;

        tracing::debug!("Output directory ready: {}", dir);
        Ok(())
    }
}

fn debug_toggles(enabled: bool) -> DebugToggles {
    if enabled {
        DebugToggles::enabled()
    } else {
        DebugToggles::disabled()
    }
}

fn android_options(target: BuildTarget, mode: BuildMode) -> AndroidOptions {
    let symbols = match mode {
        BuildMode::Development => SymbolPolicy::Minimal,
        BuildMode::Release => SymbolPolicy::Public,
    };

    AndroidOptions {
        app_bundle: target == BuildTarget::AndroidAab,
        architectures: vec![AndroidArchitecture::Arm64],
        min_sdk_version: ANDROID_MIN_SDK_VERSION,
        scripting_backend: ScriptingBackend::Il2Cpp,
        symbols,
        debug: debug_toggles(mode == BuildMode::Development),
    }
}

fn ios_options(debugging_enabled: bool) -> IosOptions {
    IosOptions {
        export_project: true,
        min_os_version: IOS_MIN_OS_VERSION.to_string(),
        scripting_backend: ScriptingBackend::Il2Cpp,
        debug: debug_toggles(debugging_enabled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_android_apk_development_options() {
        let resolver = BuildResolver::new("Builds");
        let config = resolver.resolve(&BuildIntent::android_apk());

        assert_eq!(config.mode(), BuildMode::Development);
        let PlatformOptions::Android(android) = config.platform_options() else {
            panic!("expected android options");
        };
        assert!(!android.app_bundle);
        assert_eq!(android.symbols, SymbolPolicy::Minimal);
        assert_eq!(android.debug, DebugToggles::enabled());
    }

    #[test]
    fn test_android_aab_release_options() {
        let resolver = BuildResolver::new("Builds");
        let config = resolver.resolve(&BuildIntent::android_aab());

        assert_eq!(config.mode(), BuildMode::Release);
        let PlatformOptions::Android(android) = config.platform_options() else {
            panic!("expected android options");
        };
        assert!(android.app_bundle);
        assert_eq!(android.symbols, SymbolPolicy::Public);
        assert_eq!(android.debug, DebugToggles::disabled());
        assert_eq!(android.scripting_backend, ScriptingBackend::Il2Cpp);
        assert_eq!(android.architectures, vec![AndroidArchitecture::Arm64]);
    }

    #[test]
    fn test_android_composition_is_total() {
        let resolver = BuildResolver::new("Builds");

        for target in [BuildTarget::AndroidApk, BuildTarget::AndroidAab] {
            for mode in [BuildMode::Development, BuildMode::Release] {
                let intent = BuildIntent {
                    target,
                    packaging_mode: mode,
                    debugging_enabled: false,
                };
                let config = resolver.resolve(&intent);
                assert_eq!(config.mode(), mode);
                assert_eq!(config.debugging_enabled(), mode == BuildMode::Development);
            }
        }
    }

    #[test]
    fn test_ios_always_exports_project() {
        let resolver = BuildResolver::new("Builds");

        for debugging in [true, false] {
            let config = resolver.resolve(&BuildIntent::ios(debugging));
            let PlatformOptions::Ios(ios) = config.platform_options() else {
                panic!("expected ios options");
            };
            assert!(ios.export_project);
            assert_eq!(ios.debug.any_enabled(), debugging);
        }
    }

    #[test]
    fn test_output_paths() {
        let resolver = BuildResolver::new("Builds");

        assert_eq!(
            resolver.resolve(&BuildIntent::android_apk()).output_path(),
            Utf8Path::new("Builds/android-debug.apk")
        );
        assert_eq!(
            resolver.resolve(&BuildIntent::android_aab()).output_path(),
            Utf8Path::new("Builds/android-release.aab")
        );
        assert_eq!(
            resolver.resolve(&BuildIntent::ios(true)).output_path(),
            Utf8Path::new("Builds/ios-debug")
        );
        assert_eq!(
            resolver.resolve(&BuildIntent::ios(false)).output_path(),
            Utf8Path::new("Builds/ios-release")
        );
    }

    #[test]
    fn test_scene_manifest_is_shared_and_ordered() {
        let resolver = BuildResolver::new("Builds");
        let apk = resolver.resolve(&BuildIntent::android_apk());
        let ios = resolver.resolve(&BuildIntent::ios(false));

        assert_eq!(apk.scenes(), ios.scenes());
        assert_eq!(apk.scenes()[0], "Assets/Scenes/Bootstrap.unity");
        assert_eq!(apk.scenes().len(), SCENE_MANIFEST.len());
    }

    #[test]
    fn test_prepare_output_dir_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().join("Builds")).unwrap();
        let resolver = BuildResolver::new(&root);
        let config = resolver.resolve(&BuildIntent::android_aab());

        resolver.prepare_output_dir(&config).unwrap();
        resolver.prepare_output_dir(&config).unwrap();

        assert!(root.is_dir());
    }
}
