//! Test fixtures for integration tests
//!
//! Provides a throwaway HTTP subtitle source and stand-in ffmpeg/alass
//! binaries so the sync pipeline can run without the real tools.

use axum::{routing::get, Router};
use std::path::{Path, PathBuf};

/// One-cue SubRip document
pub const SAMPLE_SRT: &str = "1\n00:00:01,000 --> 00:00:03,000\nHello\n";

/// WebVTT document as typically served by subtitle providers
pub const SAMPLE_VTT: &str =
    "WEBVTT\n\n00:00:01.000 --> 00:00:03.000\nHello\n\n00:00:04.000 --> 00:00:06.000\nWorld\n";

/// Serve `body` at `/sub.srt` and `/sub.vtt` on an ephemeral port.
/// Returns the base URL.
pub async fn serve_static(body: &'static str) -> String {
    let app = Router::new()
        .route("/sub.srt", get(move || async move { body }))
        .route("/sub.vtt", get(move || async move { body }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Shell-script stand-ins for ffmpeg and alass.
///
/// The fake ffmpeg writes a placeholder to its last argument. The fake alass
/// copies its input to its output with the first cue moved from 1s to 2s,
/// and appends a line to a run log on every invocation.
#[cfg(unix)]
pub struct FakeTools {
    dir: tempfile::TempDir,
}

#[cfg(unix)]
impl FakeTools {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let runs = dir.path().join("alass.runs");

        write_script(
            &dir.path().join("ffmpeg"),
            "#!/bin/sh\nfor last; do :; done\nprintf 'RIFF' > \"$last\"\n",
        );
        write_script(
            &dir.path().join("alass"),
            &format!(
                "#!/bin/sh\necho run >> '{}'\nsed 's/00:00:01,000/00:00:02,000/' \"$2\" > \"$3\"\n",
                runs.display()
            ),
        );
        write_script(&dir.path().join("failing"), "#!/bin/sh\nexit 1\n");
        write_script(&dir.path().join("slow"), "#!/bin/sh\nexec sleep 30\n");
        Self { dir }
    }

    pub fn ffmpeg(&self) -> PathBuf {
        self.dir.path().join("ffmpeg")
    }

    pub fn alass(&self) -> PathBuf {
        self.dir.path().join("alass")
    }

    /// Exits non-zero without producing output
    pub fn failing(&self) -> PathBuf {
        self.dir.path().join("failing")
    }

    /// Never finishes on its own
    pub fn slow(&self) -> PathBuf {
        self.dir.path().join("slow")
    }

    /// Number of times the fake alass has run
    pub fn alass_runs(&self) -> usize {
        std::fs::read_to_string(self.dir.path().join("alass.runs"))
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }
}

#[cfg(unix)]
fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, body).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
