//! Subtitle auto-sync orchestration
//!
//! One request walks through:
//! - cache check keyed on (video URL, subtitle URL)
//! - audio sample extraction with ffmpeg
//! - subtitle download and conversion to SRT (the only format alass reads)
//! - alass alignment, conversion of its output to WebVTT, cache store
//!
//! Any failure along the chain yields `None`; the caller then falls back to
//! a manual offset. Scratch files live in a per-request work directory that
//! is removed after the pipeline on every exit path.

pub mod alass;
pub mod audio;
pub mod fetch;
pub mod process;

pub use fetch::SubtitleFetcher;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::cache::TtlCache;
use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::subtitle::{srt, webvtt, SubtitleFormat};
use crate::timing::adjust_document;

/// Cache of synchronized WebVTT documents
pub type SyncCache = TtlCache<String, String>;

/// Caller-facing subtitle request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleRequest {
    pub video_url: Option<String>,
    pub subtitle_url: String,
    pub auto_sync: bool,
    pub fallback_offset_ms: i64,
}

/// Scratch directory for one sync run
#[derive(Debug)]
struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    async fn create(root: &Path) -> Result<Self> {
        let path = root.join(format!("subsync-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&path).await?;
        Ok(Self { path })
    }

    /// Run `job` on its own task inside this directory, then remove the
    /// directory whether the job succeeded, failed or panicked.
    async fn run<F, Fut, T>(self, job: F) -> Result<T>
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let handle = tokio::spawn(job(self.path.clone()));
        let joined = handle.await;
        self.cleanup().await;
        joined.map_err(|e| SyncError::Aborted(e.to_string()))?
    }

    async fn cleanup(self) {
        if let Err(e) = tokio::fs::remove_dir_all(&self.path).await {
            tracing::warn!(path = %self.path.display(), "Failed to remove work dir: {}", e);
        }
    }
}

/// Runs the auto-sync pipeline and the manual-offset fallback
#[derive(Debug, Clone)]
pub struct SyncOrchestrator {
    config: Arc<SyncConfig>,
    cache: Arc<SyncCache>,
    fetcher: SubtitleFetcher,
}

impl SyncOrchestrator {
    pub fn new(config: SyncConfig, cache: Arc<SyncCache>, fetcher: SubtitleFetcher) -> Self {
        Self {
            config: Arc::new(config),
            cache,
            fetcher,
        }
    }

    /// Build an orchestrator with its own fetcher from `config`
    pub fn from_config(config: SyncConfig, cache: Arc<SyncCache>) -> Result<Self> {
        let fetcher = SubtitleFetcher::new(config.download_timeout())?;
        Ok(Self::new(config, cache, fetcher))
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<SyncCache> {
        &self.cache
    }

    pub fn fetcher(&self) -> &SubtitleFetcher {
        &self.fetcher
    }

    /// Stable cache key for a (video, subtitle) pair
    pub fn cache_key(video_url: &str, subtitle_url: &str) -> String {
        format!("{:x}", md5::compute(format!("{}\n{}", video_url, subtitle_url)))
    }

    /// Synchronize `subtitle_url` against the audio of `video_url`.
    ///
    /// Returns the WebVTT document, or `None` when any step fails. The
    /// pipeline runs on its own task so that scratch cleanup completes even
    /// if the caller goes away.
    pub async fn sync(&self, video_url: &str, subtitle_url: &str) -> Option<String> {
        let key = Self::cache_key(video_url, subtitle_url);
        if let Some(doc) = self.cache.get(&key) {
            tracing::info!(video = %video_url, subtitle = %subtitle_url, "Auto-sync cache hit");
            return Some(doc);
        }

        let this = self.clone();
        let (video, subtitle) = (video_url.to_string(), subtitle_url.to_string());
        let task = tokio::spawn(async move { this.sync_uncached(&key, &video, &subtitle).await });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Auto-sync task failed: {}", e);
                None
            }
        }
    }

    async fn sync_uncached(&self, key: &str, video_url: &str, subtitle_url: &str) -> Option<String> {
        let started = Instant::now();
        let work = match WorkDir::create(&self.config.work_root()).await {
            Ok(work) => work,
            Err(e) => {
                tracing::warn!("Auto-sync unavailable, cannot create work dir: {}", e);
                return None;
            }
        };

        let this = self.clone();
        let (video, subtitle) = (video_url.to_string(), subtitle_url.to_string());
        let result = work
            .run(move |dir| async move { this.run_pipeline(&dir, &video, &subtitle).await })
            .await;

        match result {
            Ok(doc) => {
                tracing::info!(
                    video = %video_url,
                    subtitle = %subtitle_url,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Auto-sync succeeded"
                );
                self.cache.insert(key.to_string(), doc.clone());
                Some(doc)
            }
            Err(e) => {
                tracing::warn!(
                    video = %video_url,
                    subtitle = %subtitle_url,
                    "Auto-sync failed: {}",
                    e
                );
                None
            }
        }
    }

    async fn run_pipeline(&self, dir: &Path, video_url: &str, subtitle_url: &str) -> Result<String> {
        let audio_path = dir.join("audio.wav");
        let input_path = dir.join("input.srt");
        let output_path = dir.join("output.srt");

        audio::extract_audio(&self.config, video_url, &audio_path).await?;

        let original = self.fetcher.fetch_text(subtitle_url).await?;
        let cues = SubtitleFormat::detect(&original).parse(&original);
        if cues.is_empty() {
            return Err(SyncError::EmptyDocument);
        }
        tokio::fs::write(&input_path, srt::serialize(&cues)).await?;

        alass::synchronize(&self.config, &audio_path, &input_path, &output_path).await?;

        let synced = tokio::fs::read_to_string(&output_path).await?;
        let synced_cues = srt::parse(&synced);
        if synced_cues.is_empty() {
            return Err(SyncError::ToolFailure {
                tool: "alass".to_string(),
                reason: "output contains no cues".to_string(),
            });
        }
        Ok(webvtt::serialize(&synced_cues))
    }

    /// Serve a subtitle request: auto-sync when asked, manual offset otherwise.
    ///
    /// `None` only when the subtitle itself cannot be downloaded; sync
    /// failures degrade to the fallback offset.
    pub async fn resolve(&self, request: &SubtitleRequest) -> Option<String> {
        if request.auto_sync {
            match request.video_url.as_deref() {
                Some(video) => {
                    if let Some(doc) = self.sync(video, &request.subtitle_url).await {
                        return Some(doc);
                    }
                    tracing::info!(
                        "Auto-sync failed, using manual offset {}ms",
                        request.fallback_offset_ms
                    );
                }
                None => tracing::debug!("Auto-sync requested without a video URL"),
            }
        }

        let text = match self.fetcher.fetch_text(&request.subtitle_url).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Subtitle unavailable: {}", e);
                return None;
            }
        };
        Some(adjust_document(
            &text,
            request.fallback_offset_ms,
            SubtitleFormat::WebVtt,
        ))
    }
}
