//! alass invocation
//!
//! alass aligns a subtitle against a reference audio track. Only a global
//! alignment is wanted here, so splitting is disabled and any split it
//! might still consider is penalized heavily.

use std::path::Path;

use super::process::{require_output, run_tool};
use crate::config::SyncConfig;
use crate::error::Result;

pub fn build_alass_args(
    reference: &Path,
    input: &Path,
    output: &Path,
    split_penalty: u64,
) -> Vec<String> {
    vec![
        reference.to_string_lossy().to_string(),
        input.to_string_lossy().to_string(),
        output.to_string_lossy().to_string(),
        "--no-split".to_string(),
        "--split-penalty".to_string(),
        split_penalty.to_string(),
    ]
}

/// Align `input` (SRT) against `reference` audio, writing `output` (SRT)
pub async fn synchronize(
    config: &SyncConfig,
    reference: &Path,
    input: &Path,
    output: &Path,
) -> Result<()> {
    let args = build_alass_args(reference, input, output, config.split_penalty);
    run_tool(&config.alass_path, &args, config.sync_timeout()).await?;
    require_output("alass", output).await
}
