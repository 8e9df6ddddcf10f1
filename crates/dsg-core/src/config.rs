use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Verification authority endpoint and retry parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Where verdicts come from.
    pub endpoint: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Attempts per verification (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for the doubling backoff (e.g. 1.0 = 1s).
    pub base_delay_secs: f64,
    /// Cap on the backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/submit-data".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            max_attempts: 3,
            base_delay_secs: 1.0,
            max_delay_secs: 4,
        }
    }
}

impl VerifierConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::backoff(
            self.max_attempts,
            Duration::from_secs_f64(self.base_delay_secs),
            Duration::from_secs(self.max_delay_secs),
        )
    }
}

/// Re-issue loop parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedownloadConfig {
    /// Attempts per re-issue (including the first).
    pub max_attempts: u32,
    /// Constant delay between attempts, in seconds.
    pub delay_secs: f64,
}

impl Default for RedownloadConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_secs: 1.0,
        }
    }
}

impl RedownloadConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.max_attempts, Duration::from_secs_f64(self.delay_secs))
    }
}

/// Filename polling cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 500,
            max_attempts: 30,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Registry sweep parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Processed-set size beyond which the next sweep clears everything.
    pub max_processed: usize,
    pub sweep_interval_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_processed: 1000,
            sweep_interval_secs: 600,
        }
    }
}

impl RegistryConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Global configuration loaded from `~/.config/dsg/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateConfig {
    #[serde(default)]
    pub verifier: VerifierConfig,
    #[serde(default)]
    pub redownload: RedownloadConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dsg")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GateConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = GateConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: GateConfig = toml::from_str(&data)?;
    Ok(cfg)
}
