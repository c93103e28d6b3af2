// Command-line / environment configuration

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use url::Url;

use crate::downloader::ExtractorConfig;

#[derive(Debug, Clone, Parser)]
#[command(name = "playlist-downloader", version, about = "Playlist listing and merged video downloads over HTTP")]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long = "bind", env = "BIND_ADDR", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Origin allowed by CORS (the web frontend)
    #[arg(long, env = "ALLOWED_ORIGIN", default_value = "http://localhost:5173")]
    pub allowed_origin: String,

    /// Root under which per-request download directories are created
    #[arg(long, env = "DOWNLOAD_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// yt-dlp executable (auto-detected when unset)
    #[arg(long, env = "YTDLP_PATH")]
    pub ytdlp_path: Option<String>,

    /// Watch page a `video_id` is appended to as `?v=<id>`
    #[arg(long, env = "WATCH_URL_BASE", default_value = "https://www.youtube.com/watch")]
    pub watch_url_base: Url,

    /// Proxy passed to yt-dlp (e.g. socks5://127.0.0.1:1080)
    #[arg(long, env = "YTDLP_PROXY")]
    pub proxy: Option<String>,

    /// cookies.txt passed to yt-dlp
    #[arg(long, env = "YTDLP_COOKIES")]
    pub cookies: Option<String>,

    /// yt-dlp socket timeout in seconds (yt-dlp's default when unset)
    #[arg(long, env = "YTDLP_SOCKET_TIMEOUT")]
    pub socket_timeout: Option<u32>,

    /// Kill yt-dlp after this many seconds (unbounded when unset)
    #[arg(long, env = "YTDLP_PROCESS_TIMEOUT")]
    pub process_timeout: Option<u64>,
}

impl Config {
    pub fn temp_root(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig::default()
            .with_proxy(self.proxy.clone())
            .with_cookies_path(self.cookies.clone())
            .with_socket_timeout(self.socket_timeout)
            .with_process_timeout(self.process_timeout)
    }
}
