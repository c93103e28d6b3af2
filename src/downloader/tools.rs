// Locating the yt-dlp binary and reporting its version

use std::path::Path;

use tokio::process::Command;

const YTDLP: &str = "yt-dlp";

/// Well-known install locations checked before falling back to `which`
const COMMON_DIRS: [&str; 4] = [
    "/opt/homebrew/bin", // Homebrew on Apple Silicon
    "/usr/local/bin",    // Homebrew on Intel Mac, pipx
    "/usr/bin",          // System installation
    "/bin",
];

#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub path: String,
    pub version: Option<String>,
}

/// Resolve the yt-dlp executable: explicit override, common paths, `which`, then bare name.
pub async fn find_ytdlp(explicit: Option<&str>) -> String {
    if let Some(path) = explicit.filter(|p| !p.trim().is_empty()) {
        return path.to_string();
    }

    for dir in COMMON_DIRS {
        let candidate = Path::new(dir).join(YTDLP);
        if candidate.exists() {
            return candidate.to_string_lossy().to_string();
        }
    }

    if let Ok(output) = Command::new("which").arg(YTDLP).output().await {
        if output.status.success() {
            let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !path.is_empty() {
                return path;
            }
        }
    }

    YTDLP.to_string()
}

/// Probe `<path> --version`
pub async fn detect(path: &str) -> ToolInfo {
    let version = match Command::new(path).arg("--version").output().await {
        Ok(output) if output.status.success() => {
            let out = String::from_utf8_lossy(&output.stdout).trim().to_string();
            (!out.is_empty()).then_some(out)
        }
        _ => None,
    };

    ToolInfo {
        path: path.to_string(),
        version,
    }
}
