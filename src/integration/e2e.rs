//! End-to-end integration tests
//!
//! Drive the sync pipeline and the HTTP surface against a local subtitle
//! source and fake external tools.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

use crate::config::{ServerConfig, SyncConfig};
use crate::http::create_router;
use crate::integration::fixtures::{serve_static, SAMPLE_SRT, SAMPLE_VTT};
use crate::state::AppState;
use crate::sync::{SubtitleRequest, SyncCache, SyncOrchestrator};

fn orchestrator(config: SyncConfig) -> SyncOrchestrator {
    let cache = Arc::new(SyncCache::new(Duration::from_secs(3600)));
    SyncOrchestrator::from_config(config, cache).unwrap()
}

fn is_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[cfg(unix)]
mod with_fake_tools {
    use super::*;
    use crate::integration::fixtures::FakeTools;

    fn config(tools: &FakeTools, work: &Path) -> SyncConfig {
        SyncConfig {
            ffmpeg_path: tools.ffmpeg(),
            alass_path: tools.alass(),
            work_dir: Some(work.to_path_buf()),
            download_timeout_secs: 5,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_sync_then_cache_hit() {
        let tools = FakeTools::new();
        let work = tempfile::tempdir().unwrap();
        let orch = orchestrator(config(&tools, work.path()));
        let sub_url = format!("{}/sub.vtt", serve_static(SAMPLE_VTT).await);

        let first = orch.sync("movie.mkv", &sub_url).await.unwrap();
        assert!(first.starts_with("WEBVTT"));
        assert!(first.contains("00:00:02.000 --> 00:00:03.000\nHello\n"));
        assert!(first.contains("00:00:04.000 --> 00:00:06.000\nWorld\n"));
        assert_eq!(tools.alass_runs(), 1);
        assert!(is_empty_dir(work.path()));

        let second = orch.sync("movie.mkv", &sub_url).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(tools.alass_runs(), 1);
    }

    #[tokio::test]
    async fn test_failing_syncer_falls_back() {
        let tools = FakeTools::new();
        let work = tempfile::tempdir().unwrap();
        let orch = orchestrator(SyncConfig {
            alass_path: tools.failing(),
            ..config(&tools, work.path())
        });
        let sub_url = format!("{}/sub.srt", serve_static(SAMPLE_SRT).await);

        let request = SubtitleRequest {
            video_url: Some("movie.mkv".to_string()),
            subtitle_url: sub_url,
            auto_sync: true,
            fallback_offset_ms: 2000,
        };
        let doc = orch.resolve(&request).await.unwrap();
        assert!(doc.contains("00:00:03.000 --> 00:00:05.000\nHello\n"));
        assert!(orch.cache().is_empty());
        assert!(is_empty_dir(work.path()));
    }

    #[tokio::test]
    async fn test_absent_syncer_after_extraction_falls_back() {
        let tools = FakeTools::new();
        let work = tempfile::tempdir().unwrap();
        let orch = orchestrator(SyncConfig {
            alass_path: "/nonexistent/alass".into(),
            ..config(&tools, work.path())
        });
        let sub_url = format!("{}/sub.srt", serve_static(SAMPLE_SRT).await);

        assert_eq!(orch.sync("movie.mkv", &sub_url).await, None);
        assert!(is_empty_dir(work.path()));

        let request = SubtitleRequest {
            video_url: Some("movie.mkv".to_string()),
            subtitle_url: sub_url,
            auto_sync: true,
            fallback_offset_ms: 2000,
        };
        let doc = orch.resolve(&request).await.unwrap();
        assert!(doc.starts_with("WEBVTT"));
        assert!(doc.contains("00:00:03.000 --> 00:00:05.000\nHello\n"));
        assert!(orch.cache().is_empty());
        assert!(is_empty_dir(work.path()));
    }

    #[tokio::test]
    async fn test_oversized_timestamp_block_is_skipped() {
        let tools = FakeTools::new();
        let work = tempfile::tempdir().unwrap();
        let orch = orchestrator(config(&tools, work.path()));
        let body = "1\n9999999999999999:00:00,000 --> 9999999999999999:00:01,000\nHuge\n\n2\n00:00:01,000 --> 00:00:03,000\nHello\n";
        let sub_url = format!("{}/sub.srt", serve_static(body).await);

        let doc = orch.sync("movie.mkv", &sub_url).await.unwrap();
        assert!(doc.contains("00:00:02.000 --> 00:00:03.000\nHello\n"));
        assert!(!doc.contains("Huge"));
        assert!(is_empty_dir(work.path()));
    }

    #[tokio::test]
    async fn test_syncer_timeout_cleans_up() {
        let tools = FakeTools::new();
        let work = tempfile::tempdir().unwrap();
        let orch = orchestrator(SyncConfig {
            alass_path: tools.slow(),
            sync_timeout_secs: 1,
            ..config(&tools, work.path())
        });
        let sub_url = format!("{}/sub.srt", serve_static(SAMPLE_SRT).await);

        assert_eq!(orch.sync("movie.mkv", &sub_url).await, None);
        assert!(is_empty_dir(work.path()));
    }

    #[tokio::test]
    async fn test_http_autosync_endpoint() {
        let tools = FakeTools::new();
        let work = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            sync: config(&tools, work.path()),
            ..Default::default()
        };
        let app = create_router(Arc::new(AppState::new(config).unwrap()));
        let sub_url = format!("{}/sub.srt", serve_static(SAMPLE_SRT).await);

        let request = Request::builder()
            .uri(format!("/sub.vtt?from={}&video=movie.mkv&autosync=1", sub_url))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/vtt;charset=UTF-8"
        );
        let body = body_string(response).await;
        assert!(body.contains("00:00:02.000 --> 00:00:03.000\nHello\n"));
        assert_eq!(tools.alass_runs(), 1);
    }
}

#[tokio::test]
async fn test_missing_syncer_applies_default_offset() {
    let work = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        sync: SyncConfig {
            ffmpeg_path: "/nonexistent/ffmpeg".into(),
            alass_path: "/nonexistent/alass".into(),
            work_dir: Some(work.path().to_path_buf()),
            ..Default::default()
        },
        ..Default::default()
    };
    let app = create_router(Arc::new(AppState::new(config).unwrap()));
    let sub_url = format!("{}/sub.srt", serve_static(SAMPLE_SRT).await);

    let request = Request::builder()
        .uri(format!(
            "/sub.vtt?from={}&video=movie.mkv&autosync=1&auto=1",
            sub_url
        ))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("00:00:03.000 --> 00:00:05.000\nHello\n"));
    assert!(is_empty_dir(work.path()));
}

#[tokio::test]
async fn test_manual_negative_offset_clamps() {
    let app = create_router(Arc::new(AppState::new(ServerConfig::default()).unwrap()));
    let sub_url = format!("{}/sub.srt", serve_static(SAMPLE_SRT).await);

    let request = Request::builder()
        .uri(format!("/sub.vtt?from={}&offset=-5000", sub_url))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    let body = body_string(response).await;
    assert!(body.contains("00:00:00.000 --> 00:00:00.000\nHello\n"));
}
