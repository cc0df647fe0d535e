//! Application configuration loaded from environment variables.

use anyhow::{Context, Result};
use jid_resolver::{CredentialPaths, ResolveOptions};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Credential and mapping directories
    #[serde(default)]
    pub store: StoreConfig,

    /// Live LID lookup configuration
    #[serde(default)]
    pub lookup: LookupConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Base configuration directory
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// OAuth credential directory (defaults to `{config_dir}/credentials`)
    #[serde(default)]
    pub oauth_dir: Option<PathBuf>,

    /// Auth directory of the paired account, searched first
    #[serde(default)]
    pub auth_dir: Option<PathBuf>,

    /// Comma-separated extra mapping directories
    #[serde(default)]
    pub extra_dirs: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    /// Bridge gateway URL; live lookups are disabled when unset
    #[serde(default)]
    pub gateway_url: Option<String>,

    /// Gateway request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Verbose resolution diagnostics
    #[serde(default)]
    pub verbose: bool,
}

// Default implementations
impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            oauth_dir: None,
            auth_dir: None,
            extra_dirs: None,
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            gateway_url: None,
            timeout: default_timeout(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            verbose: false,
        }
    }
}

// Default value functions
fn default_config_dir() -> PathBuf {
    PathBuf::from("~/.whatsapp-bridge")
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_log_level() -> String {
    "info".into()
}

impl StoreConfig {
    /// Process-wide credential locations.
    pub fn credential_paths(&self) -> CredentialPaths {
        let paths = CredentialPaths::new(&self.config_dir);
        match &self.oauth_dir {
            Some(dir) => paths.with_oauth_dir(dir),
            None => paths,
        }
    }

    /// Extra mapping directories, in configured order.
    pub fn extra_dirs(&self) -> Vec<PathBuf> {
        self.extra_dirs
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .collect()
    }

    /// Per-call options carrying the caller-supplied directories.
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            auth_dir: self.auth_dir.clone(),
            lid_mapping_dirs: self.extra_dirs(),
            log_missing: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    // Phone numbers must keep their leading +
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
