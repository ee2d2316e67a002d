use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

pub const CONFIG_PATH: &str = "config.toml";
pub const API_KEY_ENV: &str = "N2YO_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// JSON array of `{id, name}` catalog entries
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Persisted element-set snapshot
    #[serde(default = "default_cache_path")]
    pub cache_path: String,

    #[serde(default = "default_upstream_base_url")]
    pub upstream_base_url: String,

    /// Upstream API key; the `N2YO_API_KEY` environment variable takes precedence
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// How many catalog entries are fetched per sweep, in catalog order
    #[serde(default = "default_catalog_slice_size")]
    pub catalog_slice_size: usize,

    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_catalog_path() -> String {
    "data/satellites.json".to_string()
}

fn default_cache_path() -> String {
    "cache/satellitesCache.json".to_string()
}

fn default_upstream_base_url() -> String {
    "https://api.n2yo.com/rest/v1/satellite".to_string()
}

fn default_catalog_slice_size() -> usize {
    100
}

fn default_request_delay_ms() -> u64 {
    200
}

fn default_cache_ttl_hours() -> u64 {
    24
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_enable_cors() -> bool {
    true
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            catalog_path: default_catalog_path(),
            cache_path: default_cache_path(),
            upstream_base_url: default_upstream_base_url(),
            api_key: None,
            catalog_slice_size: default_catalog_slice_size(),
            request_delay_ms: default_request_delay_ms(),
            cache_ttl_hours: default_cache_ttl_hours(),
            request_timeout_secs: default_request_timeout_secs(),
            enable_cors: default_enable_cors(),
        }
    }
}

impl BackendConfig {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: BackendConfig = toml::from_str(content).context("Failed to parse config")?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path))?;
        Self::from_toml_str(&content)
    }

    /// Apply environment overrides (currently only the upstream API key)
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.api_key = Some(key.trim().to_string());
            }
        }
        self
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Values too large for a `chrono::Duration` saturate to the maximum
    pub fn cache_ttl(&self) -> chrono::Duration {
        i64::try_from(self.cache_ttl_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub static CONFIG: OnceLock<BackendConfig> = OnceLock::new();

/// Load `config.toml` (defaults when absent) and publish it through `CONFIG`
pub fn read_config() -> anyhow::Result<&'static BackendConfig> {
    let config = if Path::new(CONFIG_PATH).exists() {
        BackendConfig::from_file(CONFIG_PATH)?
    } else {
        eprintln!("{} not found, using default configuration", CONFIG_PATH);
        BackendConfig::default()
    };

    Ok(CONFIG.get_or_init(|| config.with_env_overrides()))
}
