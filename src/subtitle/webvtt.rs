//! WebVTT documents

use super::cue::{format_timestamp, Cue};

/// Parse a WebVTT document. The header, NOTE/STYLE/REGION blocks and cue
/// identifiers carry no timing line and are dropped by the block parser.
pub fn parse(text: &str) -> Vec<Cue> {
    super::parse_blocks(text)
}

/// Serialize cues as WebVTT with numeric cue identifiers
pub fn serialize(cues: &[Cue]) -> String {
    let mut out = String::from("WEBVTT\n");
    for (i, cue) in cues.iter().enumerate() {
        out.push_str(&format!(
            "\n{}\n{} --> {}\n",
            i + 1,
            format_timestamp(cue.start_ms, '.'),
            format_timestamp(cue.end_ms, '.')
        ));
        for line in &cue.text {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
