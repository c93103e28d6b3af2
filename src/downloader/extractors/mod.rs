// Extractor implementations
//
// Only the native yt-dlp binary is supported; handlers depend on the
// `MediaExtractor` trait so tests can substitute a fake.

mod cli;

pub use cli::{ExtractorConfig, YtDlpCli};
