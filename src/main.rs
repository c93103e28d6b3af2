use clap::Parser;
use tracing_subscriber::EnvFilter;

use playlist_downloader_lib::config::Config;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("playlist_downloader_lib=info,tower_http=info")),
        )
        .init();

    let config = Config::parse();

    if let Err(e) = playlist_downloader_lib::run(config).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
