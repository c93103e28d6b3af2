// HTTP error envelope

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::downloader::DownloadError;

/// Body of every failed request: `{"error": true, "message": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: bool,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Download(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!(%message, "request failed");
        }

        (
            status,
            Json(ErrorEnvelope {
                error: true,
                message,
            }),
        )
            .into_response()
    }
}
