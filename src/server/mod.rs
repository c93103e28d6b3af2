// HTTP front door: router, CORS and shared state

pub mod error;
pub mod handlers;
pub mod stream;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use thiserror::Error;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use url::Url;

use crate::downloader::MediaExtractor;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid CORS origin '{0}'")]
    InvalidOrigin(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn MediaExtractor>,
    pub temp_root: PathBuf,
    pub watch_url_base: Url,
}

impl AppState {
    pub fn new(extractor: Arc<dyn MediaExtractor>, temp_root: PathBuf, watch_url_base: Url) -> Self {
        Self {
            extractor,
            temp_root,
            watch_url_base,
        }
    }

    /// Canonical page URL for a video id: `<base>?v=<id>`
    pub fn watch_url(&self, video_id: &str) -> String {
        let mut url = self.watch_url_base.clone();
        url.query_pairs_mut().append_pair("v", video_id);
        url.to_string()
    }
}

/// CORS restricted to a single frontend origin, credentials allowed.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, ServerError> {
    let trimmed = origin.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed == "*" {
        return Err(ServerError::InvalidOrigin(origin.to_string()));
    }
    let origin_value =
        HeaderValue::from_str(trimmed).map_err(|_| ServerError::InvalidOrigin(origin.to_string()))?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin_value]))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .expose_headers([header::CONTENT_DISPOSITION, header::CONTENT_LENGTH]))
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/playlist-info", get(handlers::playlist_info))
        .route("/api/download-video", get(handlers::download_video))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
