pub mod config;
pub mod downloader;
pub mod server;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use config::Config;
use downloader::{tools, YtDlpCli};
use server::{cors_layer, router, AppState, ServerError};

/// Start the HTTP server and serve until Ctrl-C.
pub async fn run(config: Config) -> Result<(), ServerError> {
    let ytdlp_path = tools::find_ytdlp(config.ytdlp_path.as_deref()).await;
    let tool = tools::detect(&ytdlp_path).await;
    match &tool.version {
        Some(version) => info!(path = %tool.path, %version, "using yt-dlp"),
        None => warn!(path = %tool.path, "yt-dlp not found or not runnable; requests will fail until it is installed"),
    }

    let temp_root = config.temp_root();
    tokio::fs::create_dir_all(&temp_root).await?;
    info!(path = %temp_root.display(), "temp download root ready");

    let extractor = Arc::new(YtDlpCli::new(ytdlp_path, config.extractor_config()));
    let state = AppState::new(extractor, temp_root, config.watch_url_base.clone());
    let app = router(state, cors_layer(&config.allowed_origin)?);

    let listener = TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, origin = %config.allowed_origin, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
