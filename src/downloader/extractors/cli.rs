// CLI extractor - drives the native `yt-dlp` binary
//
// Playlist listing: `--flat-playlist --dump-single-json` (no per-video requests).
// Download: format selection + merge into the caller's path, with the resolved
// info dict printed via `--dump-single-json --no-simulate`.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::downloader::errors::DownloadError;
use crate::downloader::format_selector::{FormatSelector, MERGE_CONTAINER};
use crate::downloader::models::{FlatPlaylist, MediaInfo};
use crate::downloader::traits::MediaExtractor;
use crate::downloader::utils::{run_output_with_timeout, summarize_stderr};

/// Options forwarded to every yt-dlp invocation
#[derive(Debug, Clone, Default)]
pub struct ExtractorConfig {
    /// SOCKS5/HTTP proxy URL
    pub proxy: Option<String>,
    /// Path to cookies.txt file
    pub cookies_path: Option<String>,
    /// yt-dlp `--socket-timeout`; `None` keeps yt-dlp's own default
    pub socket_timeout: Option<u32>,
    /// Kill yt-dlp after this many seconds; `None` waits for it
    pub process_timeout: Option<u64>,
}

impl ExtractorConfig {
    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_cookies_path(mut self, path: Option<String>) -> Self {
        self.cookies_path = path;
        self
    }

    pub fn with_socket_timeout(mut self, seconds: Option<u32>) -> Self {
        self.socket_timeout = seconds;
        self
    }

    pub fn with_process_timeout(mut self, seconds: Option<u64>) -> Self {
        self.process_timeout = seconds;
        self
    }
}

/// yt-dlp binary extractor
pub struct YtDlpCli {
    ytdlp_path: String,
    config: ExtractorConfig,
}

impl YtDlpCli {
    pub fn new(ytdlp_path: impl Into<String>, config: ExtractorConfig) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
            config,
        }
    }

    fn common_args(&self) -> Vec<String> {
        let mut args = vec!["--no-warnings".to_string(), "--no-progress".to_string()];

        if let Some(seconds) = self.config.socket_timeout {
            args.push("--socket-timeout".to_string());
            args.push(seconds.to_string());
        }

        if let Some(path) = &self.config.cookies_path {
            args.push("--cookies".to_string());
            args.push(path.clone());
        }

        if let Some(proxy) = &self.config.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args
    }

    fn playlist_args(&self, url: &str) -> Vec<String> {
        let mut args = vec![
            "--flat-playlist".to_string(),
            "--dump-single-json".to_string(),
        ];
        args.extend(self.common_args());
        // `--` keeps a user-supplied value from being read as an option
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    fn download_args(&self, url: &str, output: &Path) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            FormatSelector::best_merged(MERGE_CONTAINER),
            "--merge-output-format".to_string(),
            MERGE_CONTAINER.ext().to_string(),
            // single-file fallbacks may arrive in another container
            "--remux-video".to_string(),
            MERGE_CONTAINER.ext().to_string(),
            "--no-playlist".to_string(),
            "--no-part".to_string(),
            "--dump-single-json".to_string(),
            "--no-simulate".to_string(),
            "-o".to_string(),
            escape_template(&output.to_string_lossy()),
        ];
        args.extend(self.common_args());
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    async fn run(&self, args: Vec<String>) -> Result<Vec<u8>, DownloadError> {
        debug!(program = %self.ytdlp_path, args = ?args, "running yt-dlp");

        let out = run_output_with_timeout(&self.ytdlp_path, args, self.config.process_timeout).await?;

        if out.status.success() {
            return Ok(out.stdout);
        }

        let stderr = String::from_utf8_lossy(&out.stderr);
        let reason = summarize_stderr(&stderr);
        warn!(status = ?out.status.code(), %reason, "yt-dlp failed");
        Err(DownloadError::from(reason))
    }

    fn parse_playlist(stdout: &[u8]) -> Result<FlatPlaylist, DownloadError> {
        serde_json::from_slice(stdout)
            .map_err(|e| DownloadError::ParseError(format!("Invalid playlist JSON: {}", e)))
    }

    /// The info dict is the last JSON line on stdout.
    fn parse_media_info(stdout: &[u8]) -> Result<MediaInfo, DownloadError> {
        let text = String::from_utf8_lossy(stdout);
        let line = text
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| DownloadError::ParseError("yt-dlp printed no info JSON".to_string()))?;

        serde_json::from_str(line)
            .map_err(|e| DownloadError::ParseError(format!("Invalid info JSON: {}", e)))
    }
}

/// yt-dlp treats `-o` as a template; literal `%` must be doubled.
fn escape_template(path: &str) -> String {
    path.replace('%', "%%")
}

#[async_trait]
impl MediaExtractor for YtDlpCli {
    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }

    async fn extract_playlist(&self, url: &str) -> Result<FlatPlaylist, DownloadError> {
        let stdout = self.run(self.playlist_args(url)).await?;
        Self::parse_playlist(&stdout)
    }

    async fn download_merged(&self, url: &str, output: &Path) -> Result<MediaInfo, DownloadError> {
        let stdout = self.run(self.download_args(url, output)).await?;
        Self::parse_media_info(&stdout)
    }
}
