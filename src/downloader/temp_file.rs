// TempDownload - per-request temporary download storage
//
// Each request owns a `download-<uuid>` directory under the temp root; the
// merged file sits there next to any fragments yt-dlp leaves behind.
// Removal happens exactly once, through `cleanup()` or when the guard drops.
// A served body is usually dropped by hyper as soon as Content-Length bytes
// are out, so the synchronous drop path is the common one after streaming.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use super::format_selector::MERGE_CONTAINER;

const DIR_PREFIX: &str = "download-";

#[derive(Debug)]
pub struct TempDownload {
    dir: PathBuf,
    file: PathBuf,
    released: bool,
}

impl TempDownload {
    /// Create a fresh `download-<uuid>` directory under `root`.
    pub async fn create(root: &Path) -> std::io::Result<Self> {
        let dir = root.join(format!("{}{}", DIR_PREFIX, Uuid::new_v4().simple()));
        tokio::fs::create_dir(&dir).await?;
        let file = dir.join(format!("video.{}", MERGE_CONTAINER.ext()));
        debug!(path = %dir.display(), "created temp download dir");

        Ok(Self {
            dir,
            file,
            released: false,
        })
    }

    /// Where the extractor should write the merged file
    pub fn file_path(&self) -> &Path {
        &self.file
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Size of the merged file, or `None` if it was never written.
    pub async fn file_len(&self) -> Option<u64> {
        match tokio::fs::metadata(&self.file).await {
            Ok(meta) if meta.is_file() => Some(meta.len()),
            _ => None,
        }
    }

    /// Remove the directory now. Later calls and the eventual drop are no-ops.
    pub async fn cleanup(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if tokio::fs::try_exists(&self.dir).await.unwrap_or(false) {
            if let Err(e) = tokio::fs::remove_dir_all(&self.dir).await {
                warn!(path = %self.dir.display(), error = %e, "failed to remove temp download dir");
                return;
            }
            debug!(path = %self.dir.display(), "removed temp download dir");
        }
    }
}

impl Drop for TempDownload {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if self.dir.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.dir) {
                warn!(path = %self.dir.display(), error = %e, "failed to remove temp download dir");
            } else {
                debug!(path = %self.dir.display(), "removed temp download dir on drop");
            }
        }
    }
}
