use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

pub const CONFIG_PATH: &str = "frontend.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Full URL of the backend element-set endpoint
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Optional local catalog, used to name records that arrive without metadata
    #[serde(default)]
    pub catalog_path: Option<String>,

    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: u32,

    #[serde(default = "default_width")]
    pub width: f64,

    #[serde(default = "default_height")]
    pub height: f64,

    #[serde(default = "default_base_radius")]
    pub base_radius: f64,

    #[serde(default = "default_reference_radius_km")]
    pub reference_radius_km: f64,

    #[serde(default = "default_point_radius")]
    pub point_radius: f64,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_backend_url() -> String {
    format!("http://localhost:3000{}", orbitrack_common::ELEMENT_SETS_PATH)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_tick_rate_hz() -> u32 {
    60
}

fn default_width() -> f64 {
    1280.0
}

fn default_height() -> f64 {
    720.0
}

fn default_base_radius() -> f64 {
    0.6371
}

fn default_reference_radius_km() -> f64 {
    6371.0
}

fn default_point_radius() -> f64 {
    0.02
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            catalog_path: None,
            tick_rate_hz: default_tick_rate_hz(),
            width: default_width(),
            height: default_height(),
            base_radius: default_base_radius(),
            reference_radius_km: default_reference_radius_km(),
            point_radius: default_point_radius(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl FrontendConfig {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: FrontendConfig = toml::from_str(content).context("Failed to parse frontend config")?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path))?;
        Self::from_toml_str(&content)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate_hz.max(1)))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

pub static CONFIG: OnceLock<FrontendConfig> = OnceLock::new();

/// Load `frontend.toml` (defaults when absent) and publish it through `CONFIG`
pub fn read_config() -> anyhow::Result<&'static FrontendConfig> {
    let config = if Path::new(CONFIG_PATH).exists() {
        FrontendConfig::from_file(CONFIG_PATH)?
    } else {
        eprintln!("{} not found, using default configuration", CONFIG_PATH);
        FrontendConfig::default()
    };

    Ok(CONFIG.get_or_init(|| config))
}
