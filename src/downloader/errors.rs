// Error types for the extraction layer

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network timeout while talking to the media source
    #[error("Network timeout: the media source is not responding")]
    NetworkTimeout,

    /// The source refused the request (429, bot detection, etc.)
    #[error("The media source is throttling or blocking requests: {0}")]
    Blocked(String),

    /// yt-dlp not found in system
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// URL rejected by the extractor
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse yt-dlp JSON output
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Command execution failed
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// Extraction reported success but the merged file is not on disk
    #[error("Download finished but the file for '{title}' was not found")]
    MissingOutput { title: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unknown error with details
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl DownloadError {
    /// Missing output, naming the title when the extractor resolved one.
    pub fn missing_output(title: Option<&str>) -> Self {
        Self::MissingOutput {
            title: title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or("unknown video")
                .to_string(),
        }
    }
}

// Classify raw yt-dlp stderr
impl From<String> for DownloadError {
    fn from(s: String) -> Self {
        let lower = s.to_lowercase();

        if lower.contains("timeout") || lower.contains("timed out") {
            return Self::NetworkTimeout;
        }

        if lower.contains("429") || lower.contains("sign in to confirm") || lower.contains("blocked")
        {
            return Self::Blocked(s);
        }

        if lower.contains("command not found") {
            return Self::ToolNotFound(s);
        }

        if lower.contains("unsupported url") || lower.contains("invalid url") || lower.contains("is not a valid url") {
            return Self::InvalidUrl(s);
        }

        if lower.contains("json") {
            return Self::ParseError(s);
        }

        Self::Unknown(s)
    }
}
