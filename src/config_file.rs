//! Configuration file support
//!
//! Loads server configuration from TOML files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{CacheConfig, ServerConfig, SyncConfig};

/// Configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Server settings
    pub server: ServerSettings,
    /// Cache settings
    pub cache: Option<CacheSettings>,
    /// Auto-sync settings
    pub sync: Option<SyncSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Enable CORS
    pub cors_enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// TTL for synchronized subtitles in seconds
    pub ttl_secs: u64,
    /// Expiry sweep interval in seconds
    pub sweep_interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncSettings {
    pub ffmpeg_path: Option<PathBuf>,
    pub alass_path: Option<PathBuf>,
    pub sample_duration_secs: Option<u32>,
    pub sample_rate: Option<u32>,
    pub extract_timeout_secs: Option<u64>,
    pub sync_timeout_secs: Option<u64>,
    pub download_timeout_secs: Option<u64>,
    pub split_penalty: Option<u64>,
    pub default_offset_ms: Option<i64>,
    pub work_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ConfigFile = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        let sync = SyncConfig::default();
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 7000,
                cors_enabled: Some(true),
            },
            cache: Some(CacheSettings {
                ttl_secs: 3600,
                sweep_interval_secs: Some(60),
            }),
            sync: Some(SyncSettings {
                ffmpeg_path: Some(sync.ffmpeg_path),
                alass_path: Some(sync.alass_path),
                sample_duration_secs: Some(sync.sample_duration_secs),
                sample_rate: Some(sync.sample_rate),
                extract_timeout_secs: Some(sync.extract_timeout_secs),
                sync_timeout_secs: Some(sync.sync_timeout_secs),
                download_timeout_secs: Some(sync.download_timeout_secs),
                split_penalty: Some(sync.split_penalty),
                default_offset_ms: Some(sync.default_offset_ms),
                work_dir: None,
            }),
            logging: Some(LoggingSettings {
                level: "info".to_string(),
                format: Some("pretty".to_string()),
            }),
        }
    }

    /// Convert to ServerConfig, filling unset fields with defaults
    pub fn into_server_config(self) -> ServerConfig {
        let defaults = SyncConfig::default();
        let sync = self.sync.unwrap_or_default();
        let cache = self
            .cache
            .map(|c| CacheConfig {
                ttl_secs: c.ttl_secs,
                sweep_interval_secs: c.sweep_interval_secs.unwrap_or(60),
            })
            .unwrap_or_default();

        ServerConfig {
            host: self.server.host,
            port: self.server.port,
            cache,
            sync: SyncConfig {
                ffmpeg_path: sync.ffmpeg_path.unwrap_or(defaults.ffmpeg_path),
                alass_path: sync.alass_path.unwrap_or(defaults.alass_path),
                sample_duration_secs: sync
                    .sample_duration_secs
                    .unwrap_or(defaults.sample_duration_secs),
                sample_rate: sync.sample_rate.unwrap_or(defaults.sample_rate),
                extract_timeout_secs: sync
                    .extract_timeout_secs
                    .unwrap_or(defaults.extract_timeout_secs),
                sync_timeout_secs: sync.sync_timeout_secs.unwrap_or(defaults.sync_timeout_secs),
                download_timeout_secs: sync
                    .download_timeout_secs
                    .unwrap_or(defaults.download_timeout_secs),
                split_penalty: sync.split_penalty.unwrap_or(defaults.split_penalty),
                default_offset_ms: sync.default_offset_ms.unwrap_or(defaults.default_offset_ms),
                work_dir: sync.work_dir,
            },
            cors_enabled: self.server.cors_enabled.unwrap_or(true),
            log_level: self
                .logging
                .as_ref()
                .map(|l| l.level.clone())
                .unwrap_or_else(|| "info".to_string()),
            log_format: self
                .logging
                .and_then(|l| l.format)
                .unwrap_or_else(|| "pretty".to_string()),
        }
    }
}

/// Generate default configuration file at the specified path
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigFile::default_config();
    config.to_file(path)?;
    Ok(())
}
