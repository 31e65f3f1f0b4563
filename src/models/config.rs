use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Endpoint value shipped in the template resource before anyone configures it
pub const PLACEHOLDER_ENDPOINT: &str = "https://your-backend.example.com";

/// Read access the release gate needs from the application configuration.
///
/// `is_ready_for_release_build` is authoritative. `diagnostic_endpoint` is
/// for operator messages only and must never decide anything.
pub trait ReleaseReadiness {
    fn is_ready_for_release_build(&self) -> bool;

    fn diagnostic_endpoint(&self) -> &str;
}

/// Operational configuration bundled with the application.
///
/// Loaded from the application's config resource (YAML). Editing and
/// persisting it belongs to the project's own tooling; this crate only reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(rename = "backend_url", default)]
    backend_url: String,

    #[serde(default)]
    pub environment: Option<String>,
}

impl ApplicationConfig {
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            environment: None,
        }
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self::new(PLACEHOLDER_ENDPOINT)
    }
}

impl ReleaseReadiness for ApplicationConfig {
    /// Ready when the endpoint is set, uses https and is neither the template
    /// placeholder nor a loopback address.
    fn is_ready_for_release_build(&self) -> bool {
        let url = self.backend_url.trim();

        if url.is_empty() || url == PLACEHOLDER_ENDPOINT {
            return false;
        }

        let Some(host) = url.strip_prefix("https://") else {
            return false;
        };

        let host = host
            .split(['/', ':', '?', '#'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        !(host.is_empty()
            || host == "example.com"
            || host.ends_with(".example.com")
            || host == "localhost"
            || host == "127.0.0.1")
    }

    fn diagnostic_endpoint(&self) -> &str {
        &self.backend_url
    }
}

/// Orchestrator settings from `buildgate.yaml` and `BUILDGATE_*` variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorSettings {
    /// Root of the project handed to the engine
    #[serde(default = "default_project_path")]
    pub project_path: Utf8PathBuf,

    /// Engine executable; a bare name is looked up on `PATH` by the OS
    #[serde(default = "default_engine_executable")]
    pub engine_executable: Utf8PathBuf,

    /// Artifact directory, relative to `project_path` unless absolute
    #[serde(default = "default_output_root")]
    pub output_root: Utf8PathBuf,

    /// Application config resource, relative to `project_path` unless absolute
    #[serde(default = "default_app_config_resource")]
    pub app_config_resource: Utf8PathBuf,

    /// Where the engine writes one log file per build
    #[serde(default = "default_engine_log_dir")]
    pub engine_log_dir: Utf8PathBuf,

    /// Orchestrator's own log directory
    #[serde(default = "default_log_dir")]
    pub log_dir: Utf8PathBuf,

    #[serde(default)]
    pub debug: bool,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            project_path: default_project_path(),
            engine_executable: default_engine_executable(),
            output_root: default_output_root(),
            app_config_resource: default_app_config_resource(),
            engine_log_dir: default_engine_log_dir(),
            log_dir: default_log_dir(),
            debug: false,
        }
    }
}

impl OrchestratorSettings {
    /// Output root resolved against the project path
    pub fn resolved_output_root(&self) -> Utf8PathBuf {
        resolve_against(&self.project_path, &self.output_root)
    }

    /// Application config resource resolved against the project path
    pub fn resolved_app_config_resource(&self) -> Utf8PathBuf {
        resolve_against(&self.project_path, &self.app_config_resource)
    }
}

fn resolve_against(base: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn default_project_path() -> Utf8PathBuf {
    Utf8PathBuf::from(".")
}

fn default_engine_executable() -> Utf8PathBuf {
    Utf8PathBuf::from("Unity")
}

fn default_output_root() -> Utf8PathBuf {
    Utf8PathBuf::from("Builds")
}

fn default_app_config_resource() -> Utf8PathBuf {
    Utf8PathBuf::from("Assets/Resources/AppConfig.yaml")
}

fn default_engine_log_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("logs/engine")
}

fn default_log_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("logs")
}
