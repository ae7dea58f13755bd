//! Production configuration system
//!
//! Provides centralized configuration management with:
//! - Environment variable support
//! - Config file loading (optional, `basic` feature)
//! - Runtime defaults
//! - Validation and type safety

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{info, warn};

pub const DEFAULT_PRICING_URL: &str =
    "https://raw.githubusercontent.com/BerriAI/litellm/main/model_prices_and_context_window.json";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Log discovery paths
    pub paths: PathsConfig,

    /// Pricing resolution
    pub pricing: PricingConfig,

    /// Refresh loop
    pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// XDG-style base config directory; `claude/projects` beneath it is searched
    pub config_home: PathBuf,
    /// Home directory; `.claude/projects` beneath it is searched
    pub home: PathBuf,
    /// Additional Claude roots; `projects` beneath each is searched
    pub extra_roots: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub remote_enabled: bool,
    pub catalog_url: String,
    pub ttl_secs: u64,
    pub retry_secs: u64,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval_secs: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "WARN".to_string(),
            format: "pretty".to_string(),
            output: "console".to_string(),
            directory: PathBuf::from("logs"),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            config_home: home.join(".config"),
            home,
            extra_roots: Vec::new(),
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            remote_enabled: cfg!(feature = "pricing"),
            catalog_url: DEFAULT_PRICING_URL.to_string(),
            ttl_secs: 3600,
            retry_secs: 300,
            request_timeout_secs: 10,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self { interval_secs: 300 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            paths: PathsConfig::default(),
            pricing: PricingConfig::default(),
            refresh: RefreshConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment, file, and defaults
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        #[cfg(feature = "basic")]
        {
            let config_paths = [
                PathBuf::from("claude-burn-bar.toml"),
                PathBuf::from(".claude-burn-bar.toml"),
                dirs::config_dir()
                    .map(|d| d.join("claude-burn-bar").join("config.toml"))
                    .unwrap_or_default(),
            ];

            for path in &config_paths {
                if path.is_file() {
                    info!(config_file = %path.display(), "Loading configuration from file");
                    config = Self::load_from_file(path)?;
                    break;
                }
            }
        }

        // Override with environment variables
        config.apply_env_overrides()?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    #[cfg(feature = "basic")]
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
        if let Ok(val) = env::var("CLAUDE_BURN_LOG_DIR") {
            self.logging.directory = PathBuf::from(val);
        }

        // Path overrides
        if let Ok(val) = env::var("XDG_CONFIG_HOME") {
            if !val.trim().is_empty() {
                self.paths.config_home = PathBuf::from(val);
            }
        }
        if let Ok(val) = env::var("CLAUDE_CONFIG_DIR") {
            self.paths.extra_roots.extend(parse_root_list(&val));
        }

        // Pricing overrides
        if let Ok(val) = env::var("CLAUDE_BURN_REMOTE_PRICING") {
            self.pricing.remote_enabled = val
                .parse()
                .context("Invalid CLAUDE_BURN_REMOTE_PRICING")?;
        }
        if let Ok(val) = env::var("CLAUDE_BURN_PRICING_URL") {
            self.pricing.catalog_url = val;
        }
        if let Ok(val) = env::var("CLAUDE_BURN_PRICING_TTL_SECS") {
            self.pricing.ttl_secs = val
                .parse()
                .context("Invalid CLAUDE_BURN_PRICING_TTL_SECS")?;
        }
        if let Ok(val) = env::var("CLAUDE_BURN_PRICING_TIMEOUT_SECS") {
            self.pricing.request_timeout_secs = val
                .parse()
                .context("Invalid CLAUDE_BURN_PRICING_TIMEOUT_SECS")?;
        }

        // Refresh overrides
        if let Ok(val) = env::var("CLAUDE_BURN_REFRESH_SECS") {
            self.refresh.interval_secs = val
                .parse()
                .context("Invalid CLAUDE_BURN_REFRESH_SECS")?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.logging.output.as_str(), "console" | "file" | "both") {
            return Err(anyhow::anyhow!(
                "Log output must be one of console, file, both; got {}",
                self.logging.output
            ));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(anyhow::anyhow!(
                "Log format must be pretty or json; got {}",
                self.logging.format
            ));
        }

        if self.pricing.ttl_secs == 0 {
            return Err(anyhow::anyhow!("Pricing TTL must be greater than 0"));
        }

        if self.refresh.interval_secs == 0 {
            return Err(anyhow::anyhow!("Refresh interval must be greater than 0"));
        }

        if self.pricing.remote_enabled && !cfg!(feature = "pricing") {
            warn!("Remote pricing requested but the `pricing` feature is disabled; using built-in rates");
        }

        // File logging needs its directory
        if self.logging.output != "console" && !self.logging.directory.exists() {
            fs::create_dir_all(&self.logging.directory)
                .context("Failed to create log directory")?;
        }

        Ok(())
    }
}

/// Split a comma-separated list of directories, dropping blank entries.
pub fn parse_root_list(value: &str) -> Vec<PathBuf> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration instance
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| {
        Config::load().unwrap_or_else(|e| {
            eprintln!("Invalid configuration ({:#}), falling back to defaults", e);
            Config::default()
        })
    })
}
