// Common data models for the downloader

use serde::{Deserialize, Serialize};

/// One thumbnail candidate as listed by yt-dlp
#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

/// Entry of a flat (metadata only) playlist extraction
#[derive(Debug, Clone, Deserialize)]
pub struct FlatEntry {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
}

impl FlatEntry {
    /// Second candidate when at least two exist, otherwise the first.
    pub fn preferred_thumbnail(&self) -> Option<&Thumbnail> {
        self.thumbnails.get(1).or_else(|| self.thumbnails.first())
    }
}

/// Playlist metadata returned by `--flat-playlist --dump-single-json`
#[derive(Debug, Clone, Deserialize)]
pub struct FlatPlaylist {
    #[serde(default)]
    pub title: Option<String>,
    pub entries: Vec<FlatEntry>,
}

/// Metadata resolved for a downloaded item
#[derive(Debug, Clone, Deserialize)]
pub struct MediaInfo {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
}

/// Playlist entry as served to API clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistEntry {
    pub id: String,
    pub title: String,
    pub url: String,
    pub thumbnail: String,
    pub playlist_title: String,
}

impl PlaylistEntry {
    /// Reshape a flat entry. `fallback_url` fills in entries yt-dlp listed without a URL.
    pub fn from_flat(entry: FlatEntry, playlist_title: &str, fallback_url: impl FnOnce(&str) -> String) -> Self {
        let thumbnail = entry
            .preferred_thumbnail()
            .map(|t| t.url.clone())
            .unwrap_or_default();
        let url = entry.url.unwrap_or_else(|| fallback_url(&entry.id));

        Self {
            id: entry.id,
            title: entry.title.unwrap_or_default(),
            url,
            thumbnail,
            playlist_title: playlist_title.to_string(),
        }
    }
}
