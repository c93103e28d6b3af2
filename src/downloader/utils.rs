// Helper functions for backend implementations

use std::process::Stdio;
use std::time::Duration;

use regex::Regex;
use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use super::errors::DownloadError;

lazy_static::lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9 _.\-]").unwrap();
}

/// Run a command to completion, capturing stdout and stderr.
///
/// `timeout_secs` of `None` waits indefinitely. On timeout the child is killed.
pub async fn run_output_with_timeout(
    program: &str,
    args: Vec<String>,
    timeout_secs: Option<u64>,
) -> Result<std::process::Output, DownloadError> {
    let mut child = TokioCommand::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DownloadError::ToolNotFound(program.to_string())
            } else {
                DownloadError::ExecutionError(format!("Failed to start {}: {}", program, e))
            }
        })?;

    let mut stdout_pipe = child.stdout.take().ok_or_else(|| {
        DownloadError::ExecutionError(format!("Failed to capture stdout from {}", program))
    })?;
    let mut stderr_pipe = child.stderr.take().ok_or_else(|| {
        DownloadError::ExecutionError(format!("Failed to capture stderr from {}", program))
    })?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    let status = match timeout_secs {
        Some(secs) => match timeout(Duration::from_secs(secs), child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                let _ = child.kill().await;
                stdout_task.abort();
                stderr_task.abort();
                return Err(DownloadError::ExecutionError(format!(
                    "{} killed after {}s",
                    program, secs
                )));
            }
        },
        None => child.wait().await?,
    };

    let stdout = stdout_task
        .await
        .map_err(|e| DownloadError::ExecutionError(format!("stdout task failed: {}", e)))??;
    let stderr = stderr_task
        .await
        .map_err(|e| DownloadError::ExecutionError(format!("stderr task failed: {}", e)))??;

    Ok(std::process::Output { status, stdout, stderr })
}

/// Short, human-readable reason from yt-dlp stderr.
///
/// Prefers `ERROR:` lines; otherwise the last non-empty line.
pub fn summarize_stderr(stderr: &str) -> String {
    let important: Vec<&str> = stderr
        .lines()
        .map(|l| l.trim())
        .filter(|l| l.starts_with("ERROR:"))
        .take(2)
        .collect();

    if !important.is_empty() {
        return important.join(" | ");
    }

    stderr
        .lines()
        .rev()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
        .unwrap_or("yt-dlp exited without an error message")
        .to_string()
}

/// Strip everything but alphanumerics, spaces, `-`, `_` and `.` from `title`,
/// then append `.{ext}`.
pub fn sanitize_filename(title: &str, ext: &str) -> String {
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(title, "");
    let stem = cleaned.trim();
    let stem = if stem.is_empty() { "video" } else { stem };
    format!("{}.{}", stem, ext)
}
