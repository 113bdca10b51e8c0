//! Production configuration system
//!
//! Provides centralized configuration management with:
//! - Environment variable support
//! - Config file loading (optional)
//! - Runtime defaults
//! - Validation and type safety

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Reporting-provider tuning
    pub provider: ProviderConfig,

    /// Output configuration
    pub output: OutputConfig,

    /// Paths configuration
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the reporting API.
    pub endpoint: String,
    /// Provider's per-request row ceiling; also the saturation threshold.
    pub max_row_limit: usize,
    /// Row cap for quick-mode (interactive top-N) harvests.
    pub quick_row_limit: usize,
    /// Rolling historical window the provider retains, in months.
    pub max_lookback_months: u32,
    /// Pause between chunk requests after the first. Throttle policy, not a
    /// correctness requirement.
    pub inter_chunk_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub json_pretty: bool,
    pub table_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub log_directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "ERROR".to_string(),
                format: "pretty".to_string(),
                output: "console".to_string(),
            },
            provider: ProviderConfig {
                endpoint: "https://www.googleapis.com/webmasters/v3".to_string(),
                max_row_limit: 25_000,
                quick_row_limit: 1_000,
                max_lookback_months: 16,
                inter_chunk_delay_ms: 250,
            },
            output: OutputConfig {
                json_pretty: false,
                table_limit: 30,
            },
            paths: PathsConfig {
                log_directory: PathBuf::from("logs"),
            },
        }
    }
}

impl Config {
    /// Load configuration from environment, file, and defaults
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        // Try to load from config file if it exists
        let config_paths = [
            PathBuf::from("rankscope.toml"),
            PathBuf::from(".rankscope.toml"),
            dirs::config_dir()
                .map(|d| d.join("rankscope").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                info!(config_file = %path.display(), "Loading configuration from file");
                config = Self::load_from_file(path)?;
                break;
            }
        }

        // Override with environment variables
        config.apply_env_overrides()?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // Logging overrides
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        // Provider overrides
        if let Ok(val) = env::var("RANKSCOPE_ENDPOINT") {
            self.provider.endpoint = val;
        }
        if let Ok(val) = env::var("RANKSCOPE_MAX_ROW_LIMIT") {
            self.provider.max_row_limit = val.parse().context("Invalid RANKSCOPE_MAX_ROW_LIMIT")?;
        }
        if let Ok(val) = env::var("RANKSCOPE_QUICK_ROW_LIMIT") {
            self.provider.quick_row_limit =
                val.parse().context("Invalid RANKSCOPE_QUICK_ROW_LIMIT")?;
        }
        if let Ok(val) = env::var("RANKSCOPE_MAX_LOOKBACK_MONTHS") {
            self.provider.max_lookback_months =
                val.parse().context("Invalid RANKSCOPE_MAX_LOOKBACK_MONTHS")?;
        }
        if let Ok(val) = env::var("RANKSCOPE_INTER_CHUNK_DELAY_MS") {
            self.provider.inter_chunk_delay_ms =
                val.parse().context("Invalid RANKSCOPE_INTER_CHUNK_DELAY_MS")?;
        }

        // Output overrides
        if let Ok(val) = env::var("RANKSCOPE_TABLE_LIMIT") {
            self.output.table_limit = val.parse().context("Invalid RANKSCOPE_TABLE_LIMIT")?;
        }

        // Path overrides
        if let Ok(val) = env::var("RANKSCOPE_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.provider.endpoint.is_empty() {
            return Err(anyhow::anyhow!("Provider endpoint must not be empty"));
        }

        if self.provider.max_row_limit == 0 {
            return Err(anyhow::anyhow!("Max row limit must be greater than 0"));
        }

        if self.provider.quick_row_limit == 0
            || self.provider.quick_row_limit > self.provider.max_row_limit
        {
            return Err(anyhow::anyhow!(
                "Quick row limit must be between 1 and the max row limit, got {}",
                self.provider.quick_row_limit
            ));
        }

        if self.provider.max_lookback_months == 0 {
            return Err(anyhow::anyhow!("Max lookback months must be greater than 0"));
        }

        Ok(())
    }

    /// Save current configuration to file
    #[allow(dead_code)]
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!(path = %path.display(), "Configuration saved to file");

        Ok(())
    }
}

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration instance
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| Config::load().expect("Failed to load configuration"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "ERROR");
        assert_eq!(config.provider.max_row_limit, 25_000);
        assert_eq!(config.provider.max_lookback_months, 16);
    }

    #[test]
    fn test_env_override() {
        env::set_var("RANKSCOPE_QUICK_ROW_LIMIT", "500");
        let mut config = Config::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.provider.quick_row_limit, 500);
        env::remove_var("RANKSCOPE_QUICK_ROW_LIMIT");
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.provider.quick_row_limit = config.provider.max_row_limit + 1;
        assert!(config.validate().is_err());
    }
}
