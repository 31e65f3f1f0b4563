use crate::models::{ApplicationConfig, OrchestratorSettings};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use ::config::{Config, Environment, File, FileFormat};
use std::fs;

/// Settings file looked up in the working directory when none is given
pub const SETTINGS_FILE: &str = "buildgate.yaml";

/// Prefix for settings overrides from the environment, e.g. `BUILDGATE_OUTPUT_ROOT`
pub const ENV_PREFIX: &str = "BUILDGATE";

/// Load orchestrator settings.
///
/// Layers, lowest priority first:
/// - Built-in defaults
/// - The settings file (`buildgate.yaml`, or `settings_path` when given)
/// - `BUILDGATE_*` environment variables
///
/// An explicitly given settings file must exist; the default one is optional.
pub fn load_settings(settings_path: Option<&Utf8Path>) -> Result<OrchestratorSettings> {
    let path = settings_path.unwrap_or(Utf8Path::new(SETTINGS_FILE));
    let required = settings_path.is_some();

    let settings: OrchestratorSettings = Config::builder()
        .add_source(
            File::from(path.as_std_path())
                .format(FileFormat::Yaml)
                .required(required),
        )
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("Failed to load settings: {}", path))?
        .try_deserialize()
        .with_context(|| format!("Failed to parse settings: {}", path))?;

    Ok(settings)
}

/// Loads the application's configuration resource.
///
/// A missing resource is not an error here: it is reported as `None` so the
/// release gate can deny the build with a proper explanation.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    app_config_path: Utf8PathBuf,
}

impl ConfigManager {
    pub fn new<P: AsRef<Utf8Path>>(app_config_path: P) -> Self {
        Self {
            app_config_path: app_config_path.as_ref().to_path_buf(),
        }
    }

    pub fn from_settings(settings: &OrchestratorSettings) -> Self {
        Self::new(settings.resolved_app_config_resource())
    }

    /// Load the application configuration.
    ///
    /// # Returns
    /// `Ok(None)` if the resource doesn't exist, `Err` if it exists but can't be read or parsed
    pub fn load_application_config(&self) -> Result<Option<ApplicationConfig>> {
        if !self.app_config_path.exists() {
            tracing::warn!(
                "Application config not found at {}",
                self.app_config_path
            );
            return Ok(None);
        }

        let file_contents = fs::read_to_string(&self.app_config_path).with_context(|| {
            format!("Failed to read application config: {}", self.app_config_path)
        })?;

        let config: ApplicationConfig = serde_yaml_ng::from_str(&file_contents).with_context(|| {
            format!("Failed to parse application config: {}", self.app_config_path)
        })?;

        tracing::info!("Loaded application config from {}", self.app_config_path);
        Ok(Some(config))
    }

    /// Get the application configuration resource path.
    pub fn app_config_path(&self) -> &Utf8Path {
        &self.app_config_path
    }
}
