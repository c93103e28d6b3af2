// Request handlers

use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::ApiError;
use super::stream::file_body;
use super::AppState;
use crate::downloader::format_selector::MERGE_CONTAINER;
use crate::downloader::utils::sanitize_filename;
use crate::downloader::{DownloadError, PlaylistEntry, TempDownload};

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistQuery {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    pub videos: Vec<PlaylistEntry>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub video_id: Option<String>,
}

/// Malformed query strings (duplicate keys, bad encoding) get the JSON envelope too
fn parsed<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(q)| q)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("Missing required query parameter '{}'", name)))
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Playlist downloader API is running".to_string(),
    })
}

/// `GET /api/playlist-info?url=...`
pub async fn playlist_info(
    State(state): State<AppState>,
    query: Result<Query<PlaylistQuery>, QueryRejection>,
) -> Result<Json<PlaylistResponse>, ApiError> {
    let url = required(parsed(query)?.url, "url")?;
    info!(%url, extractor = state.extractor.name(), "listing playlist");

    let playlist = state.extractor.extract_playlist(&url).await?;
    let playlist_title = playlist.title.unwrap_or_default();

    let videos: Vec<PlaylistEntry> = playlist
        .entries
        .into_iter()
        .map(|entry| PlaylistEntry::from_flat(entry, &playlist_title, |id| state.watch_url(id)))
        .collect();

    info!(count = videos.len(), playlist = %playlist_title, "playlist listed");
    Ok(Json(PlaylistResponse { videos }))
}

/// `GET /api/download-video?video_id=...`
///
/// extract + merge into a private temp dir, then stream the file. The temp
/// dir is gone once the response body finishes or is dropped.
pub async fn download_video(
    State(state): State<AppState>,
    query: Result<Query<DownloadQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let video_id = required(parsed(query)?.video_id, "video_id")?;
    let url = state.watch_url(&video_id);
    info!(%video_id, %url, "download requested");

    let temp = TempDownload::create(&state.temp_root)
        .await
        .map_err(|e| ApiError::Internal(format!("Could not create temp download directory: {}", e)))?;

    // The merge runs to completion even if this request is dropped; the
    // guard travels with the task and is released when its output is dropped.
    let extractor = state.extractor.clone();
    let task = tokio::spawn(async move {
        let result = extractor.download_merged(&url, temp.file_path()).await;
        (temp, result)
    });
    let (mut temp, result) = task
        .await
        .map_err(|e| ApiError::Internal(format!("Download task failed: {}", e)))?;

    let media = match result {
        Ok(media) => media,
        Err(e) => {
            temp.cleanup().await;
            return Err(e.into());
        }
    };

    let Some(content_length) = temp.file_len().await else {
        warn!(%video_id, path = %temp.file_path().display(), "merged file missing");
        temp.cleanup().await;
        return Err(DownloadError::missing_output(media.title.as_deref()).into());
    };

    let title = media.title.as_deref().unwrap_or(&media.id);
    let filename = sanitize_filename(title, MERGE_CONTAINER.ext());
    info!(%video_id, %filename, bytes = content_length, "streaming download");

    let body: Body = file_body(temp)
        .await
        .map_err(|e| ApiError::Internal(format!("Could not open downloaded file: {}", e)))?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, MERGE_CONTAINER.mime_type())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .header(header::CONTENT_LENGTH, content_length)
        .body(body)
        .map_err(|e| ApiError::Internal(format!("Could not build response: {}", e)))
}
