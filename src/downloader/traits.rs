// Extraction backend trait definition

use std::path::Path;

use async_trait::async_trait;

use super::errors::DownloadError;
use super::models::{FlatPlaylist, MediaInfo};

/// Media extraction collaborator behind both endpoints
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Name of the backend (for logging)
    fn name(&self) -> &'static str;

    /// Flat, metadata-only playlist extraction
    async fn extract_playlist(&self, url: &str) -> Result<FlatPlaylist, DownloadError>;

    /// Download best video+audio for `url` and merge them into `output`.
    ///
    /// Returns once the merged file has been written (or the tool gave up).
    async fn download_merged(&self, url: &str, output: &Path) -> Result<MediaInfo, DownloadError>;
}
