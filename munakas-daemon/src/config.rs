//! Configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// When the map catalog is rebuilt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogMode {
    /// Rescan the asset directory for every new viewer
    #[default]
    PerConnection,
    /// Scan once at startup
    Cached,
}

/// Which telemetry producer feeds the broadcaster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetrySourceKind {
    /// In-process native reader library (requires the `native-bridge` feature)
    Native,
    /// External reader executable printing `PLAYERLIST:<json>` lines
    Reader,
    /// No telemetry; viewers only get the map catalog
    #[serde(rename = "none")]
    Disabled,
}

impl Default for TelemetrySourceKind {
    fn default() -> Self {
        if cfg!(feature = "native-bridge") {
            Self::Native
        } else {
            Self::Disabled
        }
    }
}

/// Telemetry producer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub source: TelemetrySourceKind,

    /// Reader executable, required when `source = "reader"`
    pub reader_path: Option<PathBuf>,

    /// Extra arguments passed to the reader executable
    pub reader_args: Vec<String>,
}

/// Daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Path to configuration file
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Address the WebSocket endpoint listens on
    pub bind_addr: String,

    /// Route of the WebSocket upgrade endpoint
    pub ws_path: String,

    /// Directory holding `<map>.txt` radar configs and their images
    pub assets_dir: PathBuf,

    /// Extension of radar images (without dot)
    pub image_extension: String,

    pub catalog_mode: CatalogMode,

    /// Delay between telemetry polls (milliseconds)
    pub poll_interval_ms: u64,

    /// Per-viewer write deadline (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    /// Inbound broadcast queue capacity
    pub queue_capacity: usize,

    /// Default log filter when RUST_LOG is unset
    pub log_level: String,

    pub telemetry: TelemetryConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            config_path: Self::default_config_path(),
            bind_addr: "127.0.0.1:8080".to_string(),
            ws_path: "/ws".to_string(),
            assets_dir: PathBuf::from("static/cs2-radar-images"),
            image_extension: "png".to_string(),
            catalog_mode: CatalogMode::PerConnection,
            poll_interval_ms: 30,
            write_timeout_ms: 2000,
            queue_capacity: 256,
            log_level: "info".to_string(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from the default location, or create it
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_config_path())
    }

    /// Load configuration from `config_path`, writing defaults there if missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file {}", config_path.display()))?;

            let mut config: DaemonConfig = toml::from_str(&contents)
                .context("Failed to parse config file")?;

            config.config_path = config_path.to_path_buf();
            Ok(config)
        } else {
            let config = Self {
                config_path: config_path.to_path_buf(),
                ..Self::default()
            };
            config.save()
                .context("Failed to save default config")?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&self.config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        (self.write_timeout_ms > 0).then(|| Duration::from_millis(self.write_timeout_ms))
    }

    /// Get default config path
    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("munakas")
            .join("config.toml")
    }
}
