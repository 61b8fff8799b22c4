//! Server configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live for synchronized subtitles in seconds
    pub ttl_secs: u64,

    /// Interval between sweeps of expired entries in seconds
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,         // 1 hour
            sweep_interval_secs: 60,
        }
    }
}

impl CacheConfig {
    /// Get the TTL as a Duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Auto-sync configuration (ffmpeg + alass)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Path or name of the ffmpeg binary
    pub ffmpeg_path: PathBuf,

    /// Path or name of the alass binary
    pub alass_path: PathBuf,

    /// Length of the audio sample taken from the start of the video
    pub sample_duration_secs: u32,

    /// Sample rate of the extracted PCM audio
    pub sample_rate: u32,

    /// Hard timeout for audio extraction
    pub extract_timeout_secs: u64,

    /// Hard timeout for the synchronizer
    pub sync_timeout_secs: u64,

    /// Request timeout for subtitle downloads
    pub download_timeout_secs: u64,

    /// Split penalty handed to alass (alongside --no-split)
    pub split_penalty: u64,

    /// Offset applied when auto-adjust is requested without an explicit offset
    pub default_offset_ms: i64,

    /// Directory for per-request scratch directories (system temp dir if unset)
    pub work_dir: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            alass_path: PathBuf::from("alass"),
            sample_duration_secs: 30,
            sample_rate: 16000,
            extract_timeout_secs: 120,
            sync_timeout_secs: 60,
            download_timeout_secs: 60,
            split_penalty: 1_000_000,
            default_offset_ms: 2000,
            work_dir: None,
        }
    }
}

impl SyncConfig {
    pub fn extract_timeout(&self) -> Duration {
        Duration::from_secs(self.extract_timeout_secs)
    }

    pub fn sync_timeout(&self) -> Duration {
        Duration::from_secs(self.sync_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    /// Base directory for scratch files
    pub fn work_root(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Cache configuration
    pub cache: CacheConfig,

    /// Auto-sync configuration
    pub sync: SyncConfig,

    /// Enable CORS
    pub cors_enabled: bool,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format (pretty, json)
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7000,
            cache: CacheConfig::default(),
            sync: SyncConfig::default(),
            cors_enabled: true,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Apply `PORT`, `FFMPEG_PATH` and `ALASS_PATH` from the environment
    pub fn apply_env(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        if let Some(path) = lookup("FFMPEG_PATH") {
            self.sync.ffmpeg_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("ALASS_PATH") {
            self.sync.alass_path = PathBuf::from(path);
        }
    }
}
