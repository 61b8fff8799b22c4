//! Audio sample extraction via ffmpeg

use std::path::Path;

use super::process::{require_output, run_tool};
use crate::config::SyncConfig;
use crate::error::Result;

/// Build the ffmpeg arguments for a mono PCM sample from the start of `video`.
pub fn build_ffmpeg_args(video: &str, output: &Path, config: &SyncConfig) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-nostdin".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-ss".to_string(),
        "0".to_string(),
        "-t".to_string(),
        config.sample_duration_secs.to_string(),
        "-i".to_string(),
        video.to_string(),
        "-vn".to_string(),
        "-acodec".to_string(),
        "pcm_s16le".to_string(),
        "-ar".to_string(),
        config.sample_rate.to_string(),
        "-ac".to_string(),
        "1".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

/// Extract the audio sample into `output` (a WAV file)
pub async fn extract_audio(config: &SyncConfig, video: &str, output: &Path) -> Result<()> {
    tracing::debug!(video = %video, "Extracting {}s audio sample", config.sample_duration_secs);
    let args = build_ffmpeg_args(video, output, config);
    run_tool(&config.ffmpeg_path, &args, config.extract_timeout()).await?;
    require_output("ffmpeg", output).await
}
