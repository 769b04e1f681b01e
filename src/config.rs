//! Configuration loading via `ortho-config`.

use std::ffi::OsString;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::lifecycle::{DEFAULT_OWNERSHIP_TAG, ManagerSettings};
use crate::session::Credentials;

/// SFS connection and lifecycle settings derived from defaults, `sfs.toml`
/// and `SFS_*` environment variables.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "SFS",
    discovery(
        app_name = "sfs",
        env_var = "SFS_CONFIG_PATH",
        config_file_name = "sfs.toml",
        dotfile_name = ".sfs.toml",
        project_file_name = "sfs.toml"
    )
)]
pub struct SfsConfig {
    /// Explicit API endpoint. When unset the public endpoint for `region` is
    /// used.
    pub endpoint: Option<String>,
    /// Cloud region. Defaults to `cn-north-4`.
    #[ortho_config(default = "cn-north-4".to_owned())]
    pub region: String,
    /// Project the shares are billed to. Required.
    pub project_id: String,
    /// Pre-issued `X-Auth-Token`. Required.
    pub auth_token: String,
    /// Availability zone requested for new shares.
    pub availability_zone: Option<String>,
    /// Seconds between two status reads.
    #[ortho_config(default = 1)]
    pub poll_interval_secs: u64,
    /// Seconds a create waits for the share to become available.
    #[ortho_config(default = 3)]
    pub wait_timeout_secs: u64,
    /// Description marking shares as provisioned by this manager.
    #[ortho_config(default = DEFAULT_OWNERSHIP_TAG.to_owned())]
    pub ownership_tag: String,
    /// Stop waiting as soon as the provider reports an error status.
    #[ortho_config(default = true)]
    pub fail_fast_on_error_status: bool,
    /// Adopt an existing owned share with the same name instead of creating
    /// a duplicate.
    #[ortho_config(default = true)]
    pub adopt_existing_by_name: bool,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }

    fn hint(&self) -> String {
        format!(
            "set {} or add {} to [sfs] in sfs.toml",
            self.env_var, self.toml_key
        )
    }
}

impl SfsConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: {}",
                metadata.description,
                metadata.hint()
            )));
        }
        Ok(())
    }

    fn require_positive(value: u64, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value == 0 {
            return Err(ConfigError::Invalid(format!(
                "{} must be greater than zero: {}",
                metadata.description,
                metadata.hint()
            )));
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from("sfs")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation. Error messages name the environment
    /// variable and configuration key that supply each value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty
    /// and [`ConfigError::Invalid`] when a duration is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.project_id,
            &FieldMetadata::new("project ID", "SFS_PROJECT_ID", "project_id"),
        )?;
        Self::require_field(
            &self.auth_token,
            &FieldMetadata::new("auth token", "SFS_AUTH_TOKEN", "auth_token"),
        )?;
        if self.endpoint.is_none() {
            Self::require_field(
                &self.region,
                &FieldMetadata::new("region", "SFS_REGION", "region"),
            )?;
        }
        Self::require_positive(
            self.poll_interval_secs,
            &FieldMetadata::new("poll interval", "SFS_POLL_INTERVAL_SECS", "poll_interval_secs"),
        )?;
        Self::require_positive(
            self.wait_timeout_secs,
            &FieldMetadata::new("wait timeout", "SFS_WAIT_TIMEOUT_SECS", "wait_timeout_secs"),
        )?;
        Ok(())
    }

    /// Returns the endpoint to talk to, deriving it from the region when no
    /// explicit endpoint is configured.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map_or_else(
                || format!("https://sfs.{}.myhuaweicloud.com", self.region.trim()),
                str::to_owned,
            )
    }

    /// Returns the credentials carried by this configuration.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.auth_token.clone())
    }

    /// Converts the lifecycle knobs into [`ManagerSettings`].
    #[must_use]
    pub fn settings(&self) -> ManagerSettings {
        ManagerSettings {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            wait_timeout: Duration::from_secs(self.wait_timeout_secs),
            ownership_tag: self.ownership_tag.trim().to_owned(),
            availability_zone: self
                .availability_zone
                .as_deref()
                .map(str::trim)
                .filter(|zone| !zone.is_empty())
                .map(str::to_owned),
            fail_fast_on_error_status: self.fail_fast_on_error_status,
            adopt_existing_by_name: self.adopt_existing_by_name,
        }
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates a field holds a value outside its accepted range.
    #[error("invalid configuration value: {0}")]
    Invalid(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
