// Downloader module - yt-dlp abstraction used by the HTTP handlers

pub mod errors;
pub mod extractors;
pub mod format_selector;
pub mod models;
pub mod temp_file;
pub mod tools;
pub mod traits;
pub mod utils;

pub use errors::DownloadError;
pub use extractors::{ExtractorConfig, YtDlpCli};
pub use models::{FlatEntry, FlatPlaylist, MediaInfo, PlaylistEntry, Thumbnail};
pub use temp_file::TempDownload;
pub use traits::MediaExtractor;
