//! End-to-end pipeline tests with a scripted backend
//!
//! These tests verify:
//! - Release builds without a usable configuration never reach the backend
//! - Release builds with a ready configuration report artifact path and size
//! - Development builds ignore the configuration entirely
//! - `build-all` skips targets the host can't build and keeps going

use buildgate::models::{BuildConfiguration, BuildResult, BuildTarget};
use buildgate::services::{BuildBackend, BuildResolver, EngineBackend, HostPlatform};
use buildgate::{BuildError, BuildIntent, ConfigManager, Orchestrator};
use camino::Utf8PathBuf;
use std::cell::{Cell, RefCell};
use std::fs;
use tempfile::TempDir;

const READY_CONFIG: &str = "backend_url: https://api.mygame.io\nenvironment: production\n";

/// Backend that records calls and "builds" by writing a fixed-size artifact
struct FakeBackend {
    unavailable: Vec<BuildTarget>,
    failing: Vec<BuildTarget>,
    builds: Cell<usize>,
    built: RefCell<Vec<BuildTarget>>,
}

impl FakeBackend {
    fn new() -> Self {
        Self {
            unavailable: Vec::new(),
            failing: Vec::new(),
            builds: Cell::new(0),
            built: RefCell::new(Vec::new()),
        }
    }

    fn without(mut self, target: BuildTarget) -> Self {
        self.unavailable.push(target);
        self
    }

    fn failing(mut self, target: BuildTarget) -> Self {
        self.failing.push(target);
        self
    }
}

impl BuildBackend for FakeBackend {
    fn check_available(&self, target: BuildTarget) -> Result<(), BuildError> {
        if self.unavailable.contains(&target) {
            return Err(BuildError::PlatformUnavailable {
                target,
                reason: "not supported on this host".to_string(),
            });
        }
        Ok(())
    }

    async fn build(&self, configuration: &BuildConfiguration) -> BuildResult {
        self.builds.set(self.builds.get() + 1);
        self.built.borrow_mut().push(configuration.target());

        if self.failing.contains(&configuration.target()) {
            return BuildResult::failed(3, "scripts have compiler errors");
        }

        let output = configuration.output_path();
        if configuration.target().produces_directory() {
            fs::create_dir_all(output).unwrap();
            fs::write(output.join("project.pbxproj"), vec![0u8; 2048]).unwrap();
        } else {
            fs::write(output, vec![0u8; 4096]).unwrap();
        }

        let size = if configuration.target().produces_directory() { 2048 } else { 4096 };
        BuildResult::succeeded(output.to_path_buf(), size)
    }
}

fn create_project() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, root)
}

fn orchestrator(root: &Utf8PathBuf, backend: FakeBackend) -> Orchestrator<FakeBackend> {
    Orchestrator::new(
        backend,
        BuildResolver::new(root.join("Builds")),
        ConfigManager::new(root.join("AppConfig.yaml")),
    )
}

#[tokio::test]
async fn test_release_without_config_is_denied() {
    let (_temp_dir, root) = create_project();
    let orchestrator = orchestrator(&root, FakeBackend::new());

    let outcome = orchestrator.run(&BuildIntent::android_aab()).await;

    assert_eq!(outcome.exit_code(), 1);
    assert!(matches!(
        outcome.result(),
        Err(BuildError::ConfigurationMissing { .. })
    ));
    assert_eq!(orchestrator.backend().builds.get(), 0);
    assert!(!root.join("Builds").exists());
}

#[tokio::test]
async fn test_release_with_ready_config_succeeds() {
    let (_temp_dir, root) = create_project();
    fs::write(root.join("AppConfig.yaml"), READY_CONFIG).unwrap();
    let orchestrator = orchestrator(&root, FakeBackend::new());

    let outcome = orchestrator.run(&BuildIntent::android_aab()).await;

    assert_eq!(outcome.exit_code(), 0);
    let build = outcome.result().as_ref().unwrap();
    assert_eq!(
        build.artifact_path(),
        Some(root.join("Builds/android-release.aab").as_path())
    );
    assert_eq!(build.artifact_size_bytes(), 4096);
    assert_eq!(orchestrator.backend().builds.get(), 1);
}

#[tokio::test]
async fn test_development_builds_ignore_config() {
    let (_temp_dir, root) = create_project();
    let orchestrator = orchestrator(&root, FakeBackend::new());

    let apk = orchestrator.run(&BuildIntent::android_apk()).await;
    let ios = orchestrator.run(&BuildIntent::ios(true)).await;

    assert_eq!(apk.exit_code(), 0);
    assert_eq!(ios.exit_code(), 0);
    assert!(root.join("Builds/android-debug.apk").is_file());
    assert!(root.join("Builds/ios-debug").is_dir());
    assert_eq!(orchestrator.backend().builds.get(), 2);
}

#[tokio::test]
async fn test_development_outcome_follows_backend() {
    let (_temp_dir, root) = create_project();
    let backend = FakeBackend::new().failing(BuildTarget::AndroidApk);
    let orchestrator = orchestrator(&root, backend);

    let outcome = orchestrator.run(&BuildIntent::android_apk()).await;

    assert_eq!(outcome.exit_code(), 1);
    assert!(matches!(
        outcome.result(),
        Err(BuildError::BackendFailure { error_count: 3, .. })
    ));
}

#[tokio::test]
async fn test_build_all_skips_unavailable_ios() {
    let (_temp_dir, root) = create_project();
    fs::write(root.join("AppConfig.yaml"), READY_CONFIG).unwrap();
    let backend = FakeBackend::new().without(BuildTarget::IosProject);
    let orchestrator = orchestrator(&root, backend);

    let report = orchestrator.run_all(false).await;

    assert_eq!(report.outcomes().len(), 3);
    assert!(report.outcome(BuildTarget::IosProject).unwrap().is_skipped());
    assert!(report.outcome(BuildTarget::AndroidApk).unwrap().is_success());
    assert!(report.outcome(BuildTarget::AndroidAab).unwrap().is_success());
    assert_eq!(report.exit_code(), 0);
    assert_eq!(
        *orchestrator.backend().built.borrow(),
        vec![BuildTarget::AndroidApk, BuildTarget::AndroidAab]
    );
}

#[tokio::test]
async fn test_build_all_continues_after_denial() {
    let (_temp_dir, root) = create_project();
    let orchestrator = orchestrator(&root, FakeBackend::new());

    // No config: the release AAB is denied, the debug APK still builds
    let report = orchestrator.run_all(true).await;

    assert!(report.outcome(BuildTarget::AndroidApk).unwrap().is_success());
    assert!(report.outcome(BuildTarget::IosProject).unwrap().is_success());
    let failed: Vec<_> = report.failures().map(|o| o.target()).collect();
    assert_eq!(failed, vec![BuildTarget::AndroidAab]);
    assert_eq!(report.exit_code(), 1);
    assert_eq!(orchestrator.metrics().total_builds(), 3);
}

#[tokio::test]
async fn test_rebuild_overwrites_artifact() {
    let (_temp_dir, root) = create_project();
    let artifact = root.join("Builds/android-debug.apk");
    fs::create_dir_all(root.join("Builds")).unwrap();
    fs::write(&artifact, b"stale").unwrap();

    let orchestrator = orchestrator(&root, FakeBackend::new());
    let outcome = orchestrator.run(&BuildIntent::android_apk()).await;

    assert!(outcome.is_success());
    assert_eq!(fs::metadata(&artifact).unwrap().len(), 4096);
}

#[tokio::test]
async fn test_build_all_with_missing_engine_fails() {
    let (_temp_dir, root) = create_project();
    fs::write(root.join("AppConfig.yaml"), READY_CONFIG).unwrap();
    let backend = EngineBackend::new(root.join("Editor/Unity"), root.clone(), root.join("logs"))
        .unwrap()
        .with_host(HostPlatform::Linux);
    let orchestrator = Orchestrator::new(
        backend,
        BuildResolver::new(root.join("Builds")),
        ConfigManager::new(root.join("AppConfig.yaml")),
    );

    let report = orchestrator.run_all(false).await;

    assert_eq!(report.exit_code(), 1);
    assert!(report.outcomes().iter().all(|o| !o.is_success()));
    for target in [BuildTarget::AndroidApk, BuildTarget::AndroidAab] {
        let outcome = report.outcome(target).unwrap();
        assert!(!outcome.is_skipped());
        assert!(matches!(
            outcome.result(),
            Err(BuildError::EngineMissing { .. })
        ));
    }
    assert!(report.outcome(BuildTarget::IosProject).unwrap().is_skipped());
    assert!(!root.join("Builds").exists());
}
