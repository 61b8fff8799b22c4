//! Subtitle candidate ranking
//!
//! Orders the subtitles found for one language: fingerprint matches first,
//! then trusted uploads, then download count. The sort is stable, so equal
//! candidates keep their search-result order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One subtitle search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub url: String,
    /// Fingerprint reported by the provider for the video this subtitle was made for
    #[serde(default)]
    pub movie_hash: Option<String>,
    #[serde(default)]
    pub fingerprint_match: bool,
    #[serde(default)]
    pub trusted: bool,
    #[serde(default)]
    pub downloads: u64,
}

impl Candidate {
    pub fn new(url: impl Into<String>, trusted: bool, downloads: u64) -> Self {
        Self {
            url: url.into(),
            movie_hash: None,
            fingerprint_match: false,
            trusted,
            downloads,
        }
    }

    pub fn with_movie_hash(mut self, hash: impl Into<String>) -> Self {
        self.movie_hash = Some(hash.into());
        self
    }
}

/// Trusted before untrusted, then more downloads first
fn by_trust_then_downloads(a: &Candidate, b: &Candidate) -> Ordering {
    b.trusted
        .cmp(&a.trusted)
        .then_with(|| b.downloads.cmp(&a.downloads))
}

/// Rank candidates, optionally against the fingerprint of the video being played.
///
/// With a target, every candidate's `fingerprint_match` flag is set and
/// matches are placed ahead of the rest. No candidate is dropped.
pub fn rank(candidates: Vec<Candidate>, target_fingerprint: Option<&str>) -> Vec<Candidate> {
    let mut ranked = candidates;

    let Some(target) = target_fingerprint.filter(|t| !t.is_empty()) else {
        ranked.sort_by(by_trust_then_downloads);
        return ranked;
    };

    for candidate in ranked.iter_mut() {
        candidate.fingerprint_match = candidate
            .movie_hash
            .as_deref()
            .map(|h| h.eq_ignore_ascii_case(target))
            .unwrap_or(false);
    }

    let matches = ranked.iter().filter(|c| c.fingerprint_match).count();
    if matches > 0 {
        tracing::debug!("{} of {} subtitle(s) match movie hash {}", matches, ranked.len(), target);
    }

    ranked.sort_by(|a, b| {
        b.fingerprint_match
            .cmp(&a.fingerprint_match)
            .then_with(|| by_trust_then_downloads(a, b))
    });
    ranked
}
