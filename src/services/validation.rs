//! Release configuration gate.
//!
//! Runs before the engine is invoked and refuses release builds whose
//! application configuration still carries placeholder values. Development
//! builds always pass: the application carries a runtime fallback for them.

use crate::error::BuildError;
use crate::models::{BuildMode, ReleaseReadiness};
use camino::{Utf8Path, Utf8PathBuf};

/// Reason given for every development build
pub const DEVELOPMENT_FALLBACK_REASON: &str = "development fallback permitted";

/// Reason given for a release build with a ready configuration
pub const RELEASE_READY_REASON: &str = "configuration ready for release";

/// Why a release build was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// The configuration resource could not be loaded
    ConfigurationMissing { resource: Utf8PathBuf },

    /// The configuration loaded but its readiness flag is false.
    ///
    /// `endpoint` is the current value, kept for the operator message only.
    ConfigurationNotReady {
        resource: Utf8PathBuf,
        endpoint: String,
    },
}

impl DenyReason {
    /// Operator-facing explanation with the remediation step
    pub fn describe(&self) -> String {
        match self {
            DenyReason::ConfigurationMissing { resource } => format!(
                "configuration resource not found: expected {}; create it and set `backend_url`",
                resource
            ),
            DenyReason::ConfigurationNotReady { resource, endpoint } => format!(
                "configuration not ready for release: backend_url is {:?}; set `backend_url` in {} to the production endpoint",
                endpoint, resource
            ),
        }
    }
}

/// Outcome of the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationDecision {
    Allow { reason: &'static str },
    Deny(DenyReason),
}

impl ValidationDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, ValidationDecision::Allow { .. })
    }

    pub fn reason(&self) -> String {
        match self {
            ValidationDecision::Allow { reason } => reason.to_string(),
            ValidationDecision::Deny(deny) => deny.describe(),
        }
    }

    /// Convert a denial into the matching [`BuildError`]
    pub fn into_result(self) -> Result<(), BuildError> {
        match self {
            ValidationDecision::Allow { .. } => Ok(()),
            ValidationDecision::Deny(DenyReason::ConfigurationMissing { resource }) => {
                Err(BuildError::ConfigurationMissing { resource })
            }
            ValidationDecision::Deny(DenyReason::ConfigurationNotReady { resource, endpoint }) => {
                Err(BuildError::ConfigurationNotReady { resource, endpoint })
            }
        }
    }
}

/// The gate itself. Holds only the resource path used in messages.
#[derive(Debug, Clone)]
pub struct ValidationGate {
    resource: Utf8PathBuf,
}

impl ValidationGate {
    pub fn new<P: AsRef<Utf8Path>>(resource: P) -> Self {
        Self {
            resource: resource.as_ref().to_path_buf(),
        }
    }

    /// Decide whether a build in `mode` may proceed.
    ///
    /// `config` is `None` when the configuration resource could not be loaded.
    /// Only `is_ready_for_release_build` decides a release build; the endpoint
    /// value is copied into the denial for display.
    pub fn evaluate<C>(&self, mode: BuildMode, config: Option<&C>) -> ValidationDecision
    where
        C: ReleaseReadiness + ?Sized,
    {
        if mode == BuildMode::Development {
            tracing::debug!("Development build: skipping release configuration checks");
            return ValidationDecision::Allow {
                reason: DEVELOPMENT_FALLBACK_REASON,
            };
        }

        let Some(config) = config else {
            tracing::error!("Release build blocked: {} not found", self.resource);
            return ValidationDecision::Deny(DenyReason::ConfigurationMissing {
                resource: self.resource.clone(),
            });
        };

        if !config.is_ready_for_release_build() {
            let endpoint = config.diagnostic_endpoint().to_string();
            tracing::error!(
                "Release build blocked: configuration not ready (backend_url = {:?})",
                endpoint
            );
            return ValidationDecision::Deny(DenyReason::ConfigurationNotReady {
                resource: self.resource.clone(),
                endpoint,
            });
        }

        tracing::info!("Release configuration validated");
        ValidationDecision::Allow {
            reason: RELEASE_READY_REASON,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApplicationConfig;

    struct Readiness {
        ready: bool,
        endpoint: String,
    }

    impl ReleaseReadiness for Readiness {
        fn is_ready_for_release_build(&self) -> bool {
            self.ready
        }

        fn diagnostic_endpoint(&self) -> &str {
            &self.endpoint
        }
    }

    fn gate() -> ValidationGate {
        ValidationGate::new("Assets/Resources/AppConfig.yaml")
    }

    #[test]
    fn test_development_allows_without_config() {
        let decision = gate().evaluate::<ApplicationConfig>(BuildMode::Development, None);
        assert_eq!(
            decision,
            ValidationDecision::Allow {
                reason: DEVELOPMENT_FALLBACK_REASON
            }
        );
    }

    #[test]
    fn test_development_allows_unready_config() {
        let config = ApplicationConfig::default();
        let decision = gate().evaluate(BuildMode::Development, Some(&config));
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_release_without_config_is_denied() {
        let decision = gate().evaluate::<ApplicationConfig>(BuildMode::Release, None);
        assert!(!decision.is_allowed());
        assert!(decision.reason().starts_with("configuration resource not found"));
    }

    #[test]
    fn test_release_unready_config_reports_endpoint() {
        let config = ApplicationConfig::default();
        let decision = gate().evaluate(BuildMode::Release, Some(&config));

        let ValidationDecision::Deny(DenyReason::ConfigurationNotReady { endpoint, .. }) = &decision
        else {
            panic!("expected not-ready denial, got {decision:?}");
        };
        assert_eq!(endpoint, crate::models::PLACEHOLDER_ENDPOINT);
        assert!(decision.reason().contains(crate::models::PLACEHOLDER_ENDPOINT));
    }

    #[test]
    fn test_endpoint_string_never_decides() {
        // A perfectly good URL does not rescue a false flag
        let unready = Readiness {
            ready: false,
            endpoint: "https://api.mygame.io".to_string(),
        };
        assert!(!gate().evaluate(BuildMode::Release, Some(&unready)).is_allowed());

        // A placeholder URL does not sink a true flag
        let ready = Readiness {
            ready: true,
            endpoint: crate::models::PLACEHOLDER_ENDPOINT.to_string(),
        };
        assert!(gate().evaluate(BuildMode::Release, Some(&ready)).is_allowed());
    }

    #[test]
    fn test_into_result_maps_denials() {
        let missing = gate().evaluate::<ApplicationConfig>(BuildMode::Release, None);
        assert!(matches!(
            missing.into_result(),
            Err(BuildError::ConfigurationMissing { .. })
        ));

        let config = ApplicationConfig::default();
        let not_ready = gate().evaluate(BuildMode::Release, Some(&config));
        assert!(matches!(
            not_ready.into_result(),
            Err(BuildError::ConfigurationNotReady { .. })
        ));

        let allowed = gate().evaluate::<ApplicationConfig>(BuildMode::Development, None);
        assert!(allowed.into_result().is_ok());
    }
}
