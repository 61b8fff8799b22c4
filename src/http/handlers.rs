//! HTTP request handlers

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::moviehash::{MovieHashRequest, MovieHashResponse};
use crate::state::AppState;
use crate::subtitle::SubtitleFormat;
use crate::sync::SubtitleRequest;

/// HTTP error type
#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    SubtitleUnavailable(String),
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            HttpError::SubtitleUnavailable(url) => (
                StatusCode::BAD_GATEWAY,
                format!("Subtitle unavailable: {}", url),
            ),
        };

        (status, body).into_response()
    }
}

/// Query string of `GET /sub.vtt`.
///
/// Everything is taken as text so a malformed value degrades to its default
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct SubtitleQuery {
    pub from: Option<String>,
    pub video: Option<String>,
    pub autosync: Option<String>,
    pub auto: Option<String>,
    pub offset: Option<String>,
}

fn flag(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some("1") | Some("true"))
}

impl SubtitleQuery {
    /// Offset applied when auto-sync is off or fails
    pub fn fallback_offset_ms(&self, default_offset_ms: i64) -> i64 {
        let offset = self
            .offset
            .as_deref()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(0);
        if offset != 0 {
            offset
        } else if flag(&self.auto) {
            default_offset_ms
        } else {
            0
        }
    }

    pub fn into_request(self, default_offset_ms: i64) -> Result<SubtitleRequest, HttpError> {
        let fallback_offset_ms = self.fallback_offset_ms(default_offset_ms);
        let subtitle_url = self
            .from
            .filter(|u| !u.is_empty())
            .ok_or_else(|| HttpError::BadRequest("Missing 'from' parameter".to_string()))?;

        Ok(SubtitleRequest {
            video_url: self.video.filter(|v| !v.is_empty()),
            subtitle_url,
            auto_sync: flag(&self.autosync),
            fallback_offset_ms,
        })
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Version endpoint
pub async fn version_check() -> &'static str {
    concat!("subsync-server v", env!("CARGO_PKG_VERSION"))
}

/// Subtitle endpoint
/// GET /sub.vtt?from=<url>&video=<url>&autosync=1&auto=1&offset=<ms>
pub async fn subtitle_vtt(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SubtitleQuery>,
) -> Result<Response, HttpError> {
    let request = query.into_request(state.config.sync.default_offset_ms)?;
    tracing::info!(
        subtitle = %request.subtitle_url,
        video = ?request.video_url,
        auto_sync = request.auto_sync,
        offset_ms = request.fallback_offset_ms,
        "Subtitle requested"
    );

    let document = state
        .orchestrator
        .resolve(&request)
        .await
        .ok_or(HttpError::SubtitleUnavailable(request.subtitle_url))?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(SubtitleFormat::WebVtt.content_type()),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("max-age=86400, public"),
    );

    Ok((headers, document).into_response())
}

/// Movie-hash endpoint
/// POST /moviehash
///
/// Bodies that fail to deserialize get the same `{success, error}` shape as
/// unsupported requests.
pub async fn movie_hash(
    payload: Result<Json<MovieHashRequest>, JsonRejection>,
) -> Json<MovieHashResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("Rejected movie-hash body: {}", rejection.body_text());
            return Json(MovieHashResponse::error(rejection.body_text()));
        }
    };
    let response = request.evaluate();
    if let MovieHashResponse::Hash { hash, size } = &response {
        tracing::debug!(size = *size, "Movie hash {}", hash);
    }
    Json(response)
}

/// Debug endpoint - sync cache statistics
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let stats = state.cache.stats();

    Json(serde_json::json!({
        "entry_count": stats.entry_count,
        "hits": stats.hits,
        "misses": stats.misses,
        "ttl_secs": stats.ttl_secs,
        "oldest_entry_age_secs": stats.oldest_entry_age_secs,
    }))
}
