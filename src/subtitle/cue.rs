//! Common cue representation and timestamp handling

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// A single subtitle cue with timing and text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// Start time in milliseconds
    pub start_ms: u64,
    /// End time in milliseconds (never before `start_ms`)
    pub end_ms: u64,
    /// Text lines in display order
    pub text: Vec<String>,
}

impl Cue {
    /// Create a new cue
    pub fn new(start_ms: u64, end_ms: u64, text: Vec<String>) -> Self {
        Self {
            start_ms,
            end_ms,
            text,
        }
    }

    /// Get the duration in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Text lines joined with newlines
    pub fn joined_text(&self) -> String {
        self.text.join("\n")
    }

    /// True when the cue carries no visible text
    pub fn is_blank(&self) -> bool {
        self.text.iter().all(|line| line.trim().is_empty())
    }

    /// Shift both boundaries by `offset_ms`, flooring at zero
    pub fn shifted(&self, offset_ms: i64) -> Self {
        Self {
            start_ms: shift_ms(self.start_ms, offset_ms),
            end_ms: shift_ms(self.end_ms, offset_ms),
            text: self.text.clone(),
        }
    }
}

/// Apply a signed offset to a timestamp, clamping at 0
pub fn shift_ms(ms: u64, offset_ms: i64) -> u64 {
    if offset_ms >= 0 {
        ms.saturating_add(offset_ms as u64)
    } else {
        ms.saturating_sub(offset_ms.unsigned_abs())
    }
}

/// `start --> end` timing line. Hours are optional (WebVTT short form);
/// the fractional separator may be `,` or `.`.
pub(crate) fn timing_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            (?:(?P<sh>\d+):)?(?P<sm>\d{1,2}):(?P<ss>\d{2})(?P<ssep>[,.])(?P<sms>\d{3})
            (?P<arrow>\s*-->\s*)
            (?:(?P<eh>\d+):)?(?P<em>\d{1,2}):(?P<es>\d{2})(?P<esep>[,.])(?P<ems>\d{3})",
        )
        .expect("timing regex is valid")
    })
}

/// Parsed timing line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TimingLine {
    pub start_ms: u64,
    pub end_ms: u64,
}

/// Parse a `start --> end` line; anything after the end timestamp
/// (WebVTT cue settings) is ignored
pub(crate) fn parse_timing_line(line: &str) -> Option<TimingLine> {
    let caps = timing_regex().captures(line)?;
    Some(TimingLine {
        start_ms: start_ms(&caps)?,
        end_ms: end_ms(&caps)?,
    })
}

pub(crate) fn start_ms(caps: &Captures<'_>) -> Option<u64> {
    captured_ms(caps, ["sh", "sm", "ss", "sms"])
}

pub(crate) fn end_ms(caps: &Captures<'_>) -> Option<u64> {
    captured_ms(caps, ["eh", "em", "es", "ems"])
}

/// Minutes and seconds must be below 60; out-of-range or overflowing
/// values make the timestamp invalid.
fn captured_ms(caps: &Captures<'_>, names: [&str; 4]) -> Option<u64> {
    let field = |name: &str| -> Option<u64> {
        match caps.name(name) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    let [h, m, s, ms] = names;
    let (hours, minutes, seconds) = (field(h)?, field(m)?, field(s)?);
    if minutes >= 60 || seconds >= 60 {
        return None;
    }
    hours
        .checked_mul(3_600_000)?
        .checked_add(minutes * 60_000 + seconds * 1000 + field(ms)?)
}

/// Format milliseconds as `HH:MM:SS<sep>mmm`
pub fn format_timestamp(ms: u64, separator: char) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours, minutes, seconds, separator, millis
    )
}
