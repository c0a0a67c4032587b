//! Path matcher configuration.
//!
//! The API prefix and segment markers are plain data so a deployment can embed
//! them in its own config file (`serde`) or supply them through the environment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_PATH_PREFIX: &str = "TENANTGATE_PATH_PREFIX";
pub const ENV_TENANT_MARKER: &str = "TENANTGATE_TENANT_MARKER";
pub const ENV_APPLICATION_MARKER: &str = "TENANTGATE_APPLICATION_MARKER";

pub const DEFAULT_PATH_PREFIX: &str = "/application/v4";
pub const DEFAULT_TENANT_MARKER: &str = "tenant";
pub const DEFAULT_APPLICATION_MARKER: &str = "application";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid path prefix '{0}': must be empty or an absolute path without dot segments")]
    InvalidPrefix(String),

    #[error("invalid {field} marker '{value}': must be a single non-empty ASCII segment")]
    InvalidMarker { field: &'static str, value: String },

    #[error("tenant and application markers must differ (both '{0}')")]
    AmbiguousMarkers(String),

    #[error("environment variable {0} is not valid unicode")]
    Env(&'static str),
}

/// Literal markers recognised by [`crate::PathMatcher`].
///
/// With the defaults, `/application/v4/tenant/{t}/application/{a}/...` is an
/// application path and `/application/v4/tenant/{t}/...` a tenant path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathMatcherConfig {
    pub prefix: String,
    pub tenant_marker: String,
    pub application_marker: String,
}

impl Default for PathMatcherConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PATH_PREFIX.to_string(),
            tenant_marker: DEFAULT_TENANT_MARKER.to_string(),
            application_marker: DEFAULT_APPLICATION_MARKER.to_string(),
        }
    }
}

impl PathMatcherConfig {
    /// Defaults overridden by `TENANTGATE_*` environment variables, when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::try_from_lookup(env_var)
    }

    /// Defaults overridden by whatever `lookup` returns for the `TENANTGATE_*`
    /// keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Self::try_from_lookup(|key| Ok(lookup(key)))
    }

    fn try_from_lookup(
        lookup: impl Fn(&'static str) -> Result<Option<String>, ConfigError>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(v) = lookup(ENV_PATH_PREFIX)? {
            config.prefix = v;
        }
        if let Some(v) = lookup(ENV_TENANT_MARKER)? {
            config.tenant_marker = v;
        }
        if let Some(v) = lookup(ENV_APPLICATION_MARKER)? {
            config.application_marker = v;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.prefix.is_empty() || self.prefix.starts_with('/'))
            || !self.prefix.is_ascii()
            || self.prefix.contains(['?', '#'])
            || self.prefix.split('/').any(is_dot_segment)
        {
            return Err(ConfigError::InvalidPrefix(self.prefix.clone()));
        }
        validate_marker("tenant", &self.tenant_marker)?;
        validate_marker("application", &self.application_marker)?;
        if self.tenant_marker == self.application_marker {
            return Err(ConfigError::AmbiguousMarkers(self.tenant_marker.clone()));
        }
        Ok(())
    }

    pub(crate) fn prefix_segments(&self) -> Vec<String> {
        self.prefix
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn validate_marker(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let ok = !value.is_empty()
        && value.is_ascii()
        && !value.contains(['/', '?', '#'])
        && value != "."
        && value != "..";
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidMarker {
            field,
            value: value.to_string(),
        })
    }
}

/// `.` or `..`, literally or percent-encoded.
pub(crate) fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}

fn env_var(key: &'static str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(v) => Ok(Some(v)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::Env(key)),
    }
}
