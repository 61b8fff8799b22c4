//! Subtitle format codec
//!
//! This module handles the two cue-list formats served to players:
//! - SubRip numbered blocks (`HH:MM:SS,mmm`), the format alass reads
//! - WebVTT documents (`HH:MM:SS.mmm`), the format players request
//! - Format detection and conversion through the common [`Cue`] list
//!
//! Malformed blocks are skipped and logged, never fatal.

pub mod cue;
pub mod srt;
pub mod webvtt;

pub use cue::{format_timestamp, Cue};

use serde::{Deserialize, Serialize};

/// Supported subtitle formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    /// SubRip numbered blocks
    Srt,
    /// WebVTT
    WebVtt,
}

impl SubtitleFormat {
    /// Guess the format of a document from its header
    pub fn detect(text: &str) -> Self {
        let first = text
            .trim_start_matches('\u{feff}')
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty());
        match first {
            Some(line) if line.starts_with("WEBVTT") => SubtitleFormat::WebVtt,
            _ => SubtitleFormat::Srt,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::WebVtt => "vtt",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "application/x-subrip;charset=UTF-8",
            SubtitleFormat::WebVtt => "text/vtt;charset=UTF-8",
        }
    }

    /// Parse a document in this format
    pub fn parse(self, text: &str) -> Vec<Cue> {
        match self {
            SubtitleFormat::Srt => srt::parse(text),
            SubtitleFormat::WebVtt => webvtt::parse(text),
        }
    }

    /// Serialize cues in this format
    pub fn serialize(self, cues: &[Cue]) -> String {
        match self {
            SubtitleFormat::Srt => srt::serialize(cues),
            SubtitleFormat::WebVtt => webvtt::serialize(cues),
        }
    }
}

/// Convert a document between formats
pub fn convert(text: &str, from: SubtitleFormat, to: SubtitleFormat) -> String {
    to.serialize(&from.parse(text))
}

/// Parse cue blocks shared by both formats.
///
/// Blocks are separated by blank lines. Inside a block every line before
/// the timing line (numeric index, WebVTT identifier) is ignored and every
/// line after it is cue text. A block without a valid timing line (the
/// WebVTT header, NOTE/STYLE blocks, garbage) is skipped.
pub(crate) fn parse_blocks(text: &str) -> Vec<Cue> {
    let normalized = text.trim_start_matches('\u{feff}').replace("\r\n", "\n");
    let mut cues = Vec::new();
    let mut current: Option<Cue> = None;
    let mut skipped = 0usize;
    let mut block_has_timing = false;
    let mut block_len = 0usize;

    for line in normalized.split('\n').map(|l| l.trim_end_matches('\r')) {
        if line.trim().is_empty() {
            if block_len > 0 && !block_has_timing {
                skipped += 1;
            }
            cues.extend(current.take());
            block_has_timing = false;
            block_len = 0;
            continue;
        }
        block_len += 1;

        if let Some(timing) = cue::parse_timing_line(line) {
            // A second timing line without a blank separator starts a new cue
            cues.extend(current.take());
            block_has_timing = true;
            if timing.end_ms < timing.start_ms {
                tracing::debug!("Skipping cue with end before start: {}", line.trim());
                skipped += 1;
                continue;
            }
            current = Some(Cue::new(timing.start_ms, timing.end_ms, Vec::new()));
        } else if let Some(cue) = current.as_mut() {
            cue.text.push(line.trim().to_string());
        }
    }
    if block_len > 0 && !block_has_timing {
        skipped += 1;
    }
    cues.extend(current);

    if skipped > 0 {
        tracing::debug!("Skipped {} subtitle block(s) without valid timing", skipped);
    }
    cues
}
