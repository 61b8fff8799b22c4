//! SubRip (SRT) documents

use super::cue::{format_timestamp, Cue};

/// Parse a SubRip document
pub fn parse(text: &str) -> Vec<Cue> {
    super::parse_blocks(text)
}

/// Serialize cues as SubRip, renumbering from 1
pub fn serialize(cues: &[Cue]) -> String {
    let mut out = String::new();
    for (i, cue) in cues.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!(
            "{}\n{} --> {}\n",
            i + 1,
            format_timestamp(cue.start_ms, ','),
            format_timestamp(cue.end_ms, ',')
        ));
        for line in &cue.text {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
