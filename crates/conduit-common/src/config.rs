//! ---
//! conduit_section: "01-core-functionality"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Shared primitives and utilities for the dispatching core."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use tracing::debug;

use crate::logging::LogFormat;

fn default_ttl() -> Duration {
    Duration::from_secs(60)
}

fn default_discovery_expiry() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

fn default_local_address_id() -> String {
    "conduit-local".to_owned()
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_file_logging() -> bool {
    true
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

fn default_metrics_enabled() -> bool {
    true
}

/// Delivery effort hint attached to outbound envelopes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Effort {
    #[default]
    Normal,
    BestEffort,
}

impl Effort {
    /// Name used in configuration files and on the wire.
    ///
    /// ```
    /// use conduit_common::config::Effort;
    ///
    /// assert_eq!(Effort::BestEffort.as_str(), "BEST_EFFORT");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Effort::Normal => "NORMAL",
            Effort::BestEffort => "BEST_EFFORT",
        }
    }
}

/// Primary configuration object for a Conduit runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub messaging: MessagingConfig,
    #[serde(default)]
    pub capabilities: CapabilitiesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Metadata describing where a [`RuntimeConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedRuntimeConfig {
    pub config: RuntimeConfig,
    pub source: PathBuf,
}

impl RuntimeConfig {
    pub const ENV_CONFIG_PATH: &str = "CONDUIT_CONFIG";

    /// Load configuration from disk, respecting the `CONDUIT_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedRuntimeConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedRuntimeConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(&path)?;
                return Ok(LoadedRuntimeConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<RuntimeConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        if self.messaging.default_ttl.is_zero() {
            return Err(anyhow!("messaging.default_ttl must be greater than zero"));
        }
        if self.capabilities.default_expiry.is_zero() {
            return Err(anyhow!(
                "capabilities.default_expiry must be greater than zero"
            ));
        }
        if self.capabilities.local_address_id.trim().is_empty() {
            return Err(anyhow!("capabilities.local_address_id must not be empty"));
        }
        Ok(())
    }
}

impl std::str::FromStr for RuntimeConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: RuntimeConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Defaults applied to outbound messaging.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    #[serde(default = "default_ttl")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub default_ttl: Duration,
    #[serde(default)]
    pub default_effort: Effort,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            default_ttl: default_ttl(),
            default_effort: Effort::Normal,
        }
    }
}

/// Settings for provider registration.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilitiesConfig {
    /// Lifetime of a discovery entry when the caller supplies no expiry date.
    #[serde(default = "default_discovery_expiry")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub default_expiry: Duration,
    /// Identifier of this runtime's in-process messaging address.
    #[serde(default = "default_local_address_id")]
    pub local_address_id: String,
}

impl Default for CapabilitiesConfig {
    fn default() -> Self {
        Self {
            default_expiry: default_discovery_expiry(),
            local_address_id: default_local_address_id(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
    /// Also write a daily rolling JSON file under `directory`.
    #[serde(default = "default_file_logging")]
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
            file: default_file_logging(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}
