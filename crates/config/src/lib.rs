#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for conngate
//!
//! This crate handles loading and merging connection limits from:
//! - Default values (no limits, matching a freshly constructed manager)
//! - Configuration file (TOML)
//! - Environment variables
//!
//! Quotas are fixed for the process lifetime: the configuration is read
//! once at startup, validated, and turned into a
//! [`ResourceManager`](conngate_resources::ResourceManager).

use std::path::Path;

use conngate_errors::{ConfigError, Error};
use conngate_resources::{IntoResourceLimits, ResourceLimits, ResourceManager};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

/// Environment override for the normal connection quota
pub const ENV_MAX_CONNECTIONS: &str = "CONNGATE_MAX_CONNECTIONS";

/// Environment override for the upgraded connection quota
pub const ENV_MAX_UPGRADED_CONNECTIONS: &str = "CONNGATE_MAX_UPGRADED_CONNECTIONS";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Connection limit configuration
///
/// An absent key means the category has no limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LimitsConfig {
    /// Maximum concurrently held connections
    #[serde(default)]
    pub max_connections: Option<i64>,
    /// Maximum connections switched to a different protocol
    #[serde(default)]
    pub max_upgraded_connections: Option<i64>,
}

impl Config {
    /// Load and validate configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file does not exist,
    /// [`ConfigError::ReadError`] on other I/O failures,
    /// [`ConfigError::ParseError`] on invalid TOML, and
    /// [`ConfigError::InvalidValue`] on a negative quota.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.display().to_string(),
                }
            } else {
                ConfigError::ReadError {
                    path: path.display().to_string(),
                    error: err.to_string(),
                }
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|err| ConfigError::ParseError {
            message: err.to_string(),
        })?;
        config.validate()?;

        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent
    ///
    /// # Errors
    ///
    /// Propagates every failure except a missing file.
    pub async fn load_or_default(path: &Path) -> Result<Self, Error> {
        match Self::load(path).await {
            Err(Error::Config(ConfigError::NotFound { .. })) => {
                debug!(path = %path.display(), "no configuration file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Apply quota overrides from the environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EnvVarInvalid`] when a set variable does not
    /// parse as an integer, and [`ConfigError::InvalidValue`] when the
    /// resulting quota is negative.
    pub fn apply_env_overrides(&mut self) -> Result<(), Error> {
        if let Some(quota) = env_quota(ENV_MAX_CONNECTIONS)? {
            self.limits.max_connections = Some(quota);
        }
        if let Some(quota) = env_quota(ENV_MAX_UPGRADED_CONNECTIONS)? {
            self.limits.max_upgraded_connections = Some(quota);
        }
        self.validate()
    }

    /// Check that every configured quota is usable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a negative quota.
    pub fn validate(&self) -> Result<(), Error> {
        validate_quota("limits.max_connections", self.limits.max_connections)?;
        validate_quota(
            "limits.max_upgraded_connections",
            self.limits.max_upgraded_connections,
        )?;
        Ok(())
    }

    /// Build the resource manager described by this configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configured quota is negative.
    pub fn build_resources(&self) -> Result<ResourceManager, Error> {
        ResourceManager::from_limits(&self.clone().into_resource_limits())
    }
}

impl IntoResourceLimits for Config {
    fn into_resource_limits(self) -> ResourceLimits {
        ResourceLimits {
            max_connections: self.limits.max_connections,
            max_upgraded_connections: self.limits.max_upgraded_connections,
        }
    }
}

fn validate_quota(field: &str, quota: Option<i64>) -> Result<(), Error> {
    match quota {
        Some(value) if value < 0 => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }
        .into()),
        _ => Ok(()),
    }
}

fn env_quota(var: &str) -> Result<Option<i64>, Error> {
    match std::env::var(var) {
        Ok(value) => {
            let quota = value.parse::<i64>().map_err(|_| ConfigError::EnvVarInvalid {
                var: var.to_string(),
                value: value.clone(),
            })?;
            Ok(Some(quota))
        }
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::EnvVarInvalid {
            var: var.to_string(),
            value: "<non-unicode>".to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_no_limits() {
        let config = Config::default();
        assert_eq!(config.limits.max_connections, None);
        assert_eq!(config.limits.max_upgraded_connections, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_limits_section() {
        let config: Config = toml::from_str(
            r#"
            [limits]
            max_connections = 100
            max_upgraded_connections = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.limits.max_connections, Some(100));
        assert_eq!(config.limits.max_upgraded_connections, Some(10));
    }

    #[test]
    fn partial_limits_section_keeps_other_category_unlimited() {
        let config: Config = toml::from_str(
            r#"
            [limits]
            max_connections = 64
            "#,
        )
        .unwrap();
        assert_eq!(config.limits.max_connections, Some(64));
        assert_eq!(config.limits.max_upgraded_connections, None);
    }

    #[test]
    fn negative_quota_fails_validation() {
        let config: Config = toml::from_str(
            r#"
            [limits]
            max_connections = -1
            "#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn builds_manager_with_configured_quotas() {
        let config: Config = toml::from_str(
            r#"
            [limits]
            max_connections = 2
            "#,
        )
        .unwrap();
        let manager = config.build_resources().unwrap();
        assert_eq!(manager.normal_connections().quota(), Some(2));
        assert_eq!(manager.upgraded_connections().quota(), None);
    }

    #[test]
    fn env_quota_parses_integers_and_rejects_garbage() {
        std::env::set_var("CONNGATE_TEST_QUOTA_OK", "42");
        assert_eq!(env_quota("CONNGATE_TEST_QUOTA_OK").unwrap(), Some(42));
        std::env::remove_var("CONNGATE_TEST_QUOTA_OK");

        assert_eq!(env_quota("CONNGATE_TEST_QUOTA_UNSET").unwrap(), None);

        std::env::set_var("CONNGATE_TEST_QUOTA_BAD", "many");
        let err = env_quota("CONNGATE_TEST_QUOTA_BAD").unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::EnvVarInvalid { .. })
        ));
        std::env::remove_var("CONNGATE_TEST_QUOTA_BAD");
    }

    #[test]
    fn env_overrides_replace_file_values() {
        std::env::set_var(ENV_MAX_CONNECTIONS, "9");
        let mut config = Config::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.limits.max_connections, Some(9));
        assert_eq!(config.limits.max_upgraded_connections, None);
        std::env::remove_var(ENV_MAX_CONNECTIONS);
    }

    #[tokio::test]
    async fn loads_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conngate.toml");
        tokio::fs::write(
            &path,
            r#"
            [limits]
            max_connections = 512
            max_upgraded_connections = 16
            "#,
        )
        .await
        .unwrap();

        let config = Config::load(&path).await.unwrap();
        assert_eq!(config.limits.max_connections, Some(512));
        assert_eq!(config.limits.max_upgraded_connections, Some(16));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = Config::load(&path).await.unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::NotFound { .. })));

        let config = Config::load_or_default(&path).await.unwrap();
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn invalid_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        tokio::fs::write(&path, "[limits\nmax_connections = 1")
            .await
            .unwrap();

        let err = Config::load(&path).await.unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ParseError { .. })));
    }

    #[tokio::test]
    async fn negative_quota_in_file_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("negative.toml");
        tokio::fs::write(&path, "[limits]\nmax_upgraded_connections = -7")
            .await
            .unwrap();

        let err = Config::load(&path).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { .. })
        ));
    }
}
