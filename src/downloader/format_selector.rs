// FormatSelector - yt-dlp format specs for merged downloads
//
// The selector prefers a container (mp4) and falls back step by step:
//   1. best video + best audio already in that container
//   2. best single file in that container
//   3. best video + best audio in any container
//   4. best single file of any kind
// yt-dlp muxes the result into the container via --merge-output-format, and
// --remux-video covers the single-file fallbacks.

/// Container every download is merged into
pub const MERGE_CONTAINER: Container = Container::Mp4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Mp4,
}

impl Container {
    pub fn ext(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
        }
    }

    /// Audio stream extension that muxes cleanly into this container
    fn audio_ext(&self) -> &'static str {
        match self {
            Self::Mp4 => "m4a",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
        }
    }
}

pub struct FormatSelector;

impl FormatSelector {
    /// Best-quality spec preferring `container`, with progressive fallbacks
    pub fn best_merged(container: Container) -> String {
        let ext = container.ext();
        format!(
            "bv*[ext={ext}]+ba[ext={audio}]/b[ext={ext}]/bv*+ba/b",
            ext = ext,
            audio = container.audio_ext()
        )
    }
}
