//! Timing adjustment
//!
//! Shifts cue boundaries by a signed millisecond offset. Positive offsets
//! delay the subtitle, negative offsets advance it; no timestamp ever goes
//! below zero. Nothing here fails: malformed input passes through.

use regex::Captures;

use crate::subtitle::cue::{self, format_timestamp, shift_ms, Cue};
use crate::subtitle::SubtitleFormat;

/// First cue later than this is considered late by [`estimate_offset`]
const LATE_FIRST_CUE_MS: u64 = 5000;

/// Where [`estimate_offset`] moves a late first cue to
const TARGET_FIRST_CUE_MS: u64 = 2000;

/// Shift every cue by `offset_ms`
pub fn adjust(cues: &[Cue], offset_ms: i64) -> Vec<Cue> {
    if offset_ms == 0 {
        return cues.to_vec();
    }
    cues.iter().map(|c| c.shifted(offset_ms)).collect()
}

/// Shift timestamps directly in serialized text.
///
/// Only the matched `start --> end` pair on each line is rewritten (each
/// side keeps its fractional separator); every other byte of the input is
/// left untouched.
pub fn adjust_text(text: &str, offset_ms: i64) -> String {
    if offset_ms == 0 {
        return text.to_string();
    }
    cue::timing_regex()
        .replace_all(text, |caps: &Captures<'_>| rewrite_pair(caps, offset_ms))
        .into_owned()
}

fn rewrite_pair(caps: &Captures<'_>, offset_ms: i64) -> String {
    let (Some(start), Some(end)) = (cue::start_ms(caps), cue::end_ms(caps)) else {
        return caps[0].to_string();
    };
    let sep = |name: &str| caps[name].chars().next().unwrap_or(',');
    format!(
        "{}{}{}",
        format_timestamp(shift_ms(start, offset_ms), sep("ssep")),
        &caps["arrow"],
        format_timestamp(shift_ms(end, offset_ms), sep("esep"))
    )
}

/// Shift a whole document and render it as `output`.
///
/// Parses and re-serializes when at least one cue is recognised, otherwise
/// falls back to [`adjust_text`] on the original text.
pub fn adjust_document(text: &str, offset_ms: i64, output: SubtitleFormat) -> String {
    let cues = SubtitleFormat::detect(text).parse(text);
    if cues.is_empty() {
        tracing::debug!("No cues parsed, adjusting timestamps in place");
        return adjust_text(text, offset_ms);
    }
    output.serialize(&adjust(&cues, offset_ms))
}

/// Rough offset guess from the first spoken cue.
///
/// Dialogue usually starts within the first seconds; when the first
/// non-blank cue starts after 5s it is pulled back to 2s.
pub fn estimate_offset(cues: &[Cue]) -> i64 {
    if cues.len() < 2 {
        return 0;
    }
    match cues.iter().find(|c| c.start_ms > 0 && !c.is_blank()) {
        Some(first) if first.start_ms > LATE_FIRST_CUE_MS => {
            -((first.start_ms - TARGET_FIRST_CUE_MS) as i64)
        }
        _ => 0,
    }
}
