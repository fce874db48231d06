/*
[INPUT]:  Built-in defaults, optional YAML file, CARBONHUB_* environment
[OUTPUT]: Resolved application configuration
[POS]:    Configuration layer - client, session and wallet setup
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use carbonhub_adapter::{AccountType, ClientConfig, http::DEFAULT_API_HOST};
use config::{Config, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};

/// Environment variable prefix, e.g. `CARBONHUB_API_HOST`
pub const ENV_PREFIX: &str = "CARBONHUB";

/// Top-level configuration for the CarbonHub client
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    /// Base URL of the authentication / swap / emission service
    pub api_host: String,
    /// Session file; defaults to `<data_dir>/carbonhub/session.json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_path: Option<PathBuf>,
    /// Wallet key file; defaults to `<data_dir>/carbonhub/wallet.key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_path: Option<PathBuf>,
    /// Account type used by `login` when none is given
    pub account_type: AccountType,
    pub price_refresh_secs: u64,
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            session_path: None,
            key_path: None,
            account_type: AccountType::User,
            price_refresh_secs: 10,
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load defaults, then `path` (if any), then the process environment
    pub fn load(path: Option<&Path>, api_host: Option<String>) -> Result<Self> {
        Self::load_with_env(path, api_host, None)
    }

    /// Same as [`AppConfig::load`], reading environment values from `env`
    /// instead of the process when given.
    pub fn load_with_env(
        path: Option<&Path>,
        api_host: Option<String>,
        env: Option<Map<String, String>>,
    ) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("api_host", defaults.api_host)?
            .set_default("account_type", defaults.account_type.as_str())?
            .set_default("price_refresh_secs", defaults.price_refresh_secs)?
            .set_default("timeout_secs", defaults.timeout_secs)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).source(env))
            .set_override_option("api_host", api_host)?
            .build()
            .context("read configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.api_host.trim().is_empty() {
            anyhow::bail!("api_host must not be empty");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            ..ClientConfig::with_api_host(self.api_host.clone())
        }
    }

    pub fn price_refresh(&self) -> Duration {
        Duration::from_secs(self.price_refresh_secs.max(1))
    }

    /// Write this configuration as YAML
    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("failed to serialize config to YAML")?;
        std::fs::write(path, yaml)
            .with_context(|| format!("failed to write config to {}", path.display()))
    }
}
