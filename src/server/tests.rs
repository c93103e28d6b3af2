use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use url::Url;

use super::{cors_layer, router, AppState};
use crate::downloader::{DownloadError, FlatEntry, FlatPlaylist, MediaExtractor, MediaInfo, Thumbnail};

const ORIGIN: &str = "http://localhost:5173";

#[derive(Clone)]
enum Mode {
    Succeed,
    Fail(String),
    SkipWrite,
}

struct FakeExtractor {
    mode: Mode,
    title: Option<String>,
    payload: Vec<u8>,
    entries: Vec<FlatEntry>,
    urls: Mutex<Vec<String>>,
    outputs: Mutex<Vec<PathBuf>>,
}

impl FakeExtractor {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            title: Some("Song: Cool/Mix?".to_string()),
            payload: b"fake merged mp4 bytes".to_vec(),
            entries: Vec::new(),
            urls: Mutex::new(Vec::new()),
            outputs: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MediaExtractor for FakeExtractor {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn extract_playlist(&self, url: &str) -> Result<FlatPlaylist, DownloadError> {
        self.urls.lock().unwrap().push(url.to_string());
        match &self.mode {
            Mode::Fail(msg) => Err(DownloadError::from(msg.clone())),
            _ => Ok(FlatPlaylist {
                title: Some("Road Trip".to_string()),
                entries: self.entries.clone(),
            }),
        }
    }

    async fn download_merged(&self, url: &str, output: &Path) -> Result<MediaInfo, DownloadError> {
        self.urls.lock().unwrap().push(url.to_string());
        self.outputs.lock().unwrap().push(output.to_path_buf());

        match &self.mode {
            Mode::Fail(msg) => {
                // a failed run can still leave fragments behind
                tokio::fs::write(output.with_extension("f137.mp4.part"), b"partial").await?;
                Err(DownloadError::from(msg.clone()))
            }
            Mode::SkipWrite => Ok(MediaInfo {
                id: "abc".to_string(),
                title: self.title.clone(),
                ext: Some("mp4".to_string()),
            }),
            Mode::Succeed => {
                tokio::fs::write(output, &self.payload).await?;
                Ok(MediaInfo {
                    id: "abc".to_string(),
                    title: self.title.clone(),
                    ext: Some("mp4".to_string()),
                })
            }
        }
    }
}

fn app(fake: Arc<FakeExtractor>, root: &Path) -> Router {
    let state = AppState::new(
        fake,
        root.to_path_buf(),
        Url::parse("https://www.youtube.com/watch").unwrap(),
    );
    router(state, cors_layer(ORIGIN).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn count_files(root: &Path) -> usize {
    let mut count = 0;
    for entry in std::fs::read_dir(root).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            count += count_files(&path);
        } else {
            count += 1;
        }
    }
    count
}

fn count_entries(root: &Path) -> usize {
    std::fs::read_dir(root).unwrap().count()
}

async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn entry(id: &str, thumbnails: &[&str]) -> FlatEntry {
    FlatEntry {
        id: id.to_string(),
        title: Some(format!("Track {}", id)),
        url: Some(format!("https://www.youtube.com/watch?v={}", id)),
        thumbnails: thumbnails
            .iter()
            .map(|u| Thumbnail { url: u.to_string() })
            .collect(),
    }
}

#[tokio::test]
async fn root_reports_message() {
    let root = tempfile::tempdir().unwrap();
    let response = app(Arc::new(FakeExtractor::new(Mode::Succeed)), root.path())
        .oneshot(get("/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response.into_body()).await;
    assert!(!json["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn playlist_lists_every_entry() {
    let root = tempfile::tempdir().unwrap();
    let mut fake = FakeExtractor::new(Mode::Succeed);
    fake.entries = vec![
        entry("a", &["a0", "a1", "a2"]),
        entry("b", &["b0"]),
        entry("c", &["c0", "c1"]),
    ];
    let fake = Arc::new(fake);

    let response = app(fake.clone(), root.path())
        .oneshot(get("/api/playlist-info?url=https%3A%2F%2Fwww.youtube.com%2Fplaylist%3Flist%3DPL1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response.into_body()).await;
    let videos = json["videos"].as_array().unwrap();
    assert_eq!(videos.len(), 3);

    assert_eq!(videos[0]["id"], "a");
    assert_eq!(videos[0]["title"], "Track a");
    assert_eq!(videos[0]["url"], "https://www.youtube.com/watch?v=a");
    assert_eq!(videos[0]["thumbnail"], "a1");
    assert_eq!(videos[1]["thumbnail"], "b0");
    assert_eq!(videos[2]["thumbnail"], "c1");
    assert!(videos.iter().all(|v| v["playlistTitle"] == "Road Trip"));

    assert_eq!(
        fake.urls.lock().unwrap().as_slice(),
        ["https://www.youtube.com/playlist?list=PL1"]
    );
}

#[tokio::test]
async fn playlist_failure_is_500_envelope() {
    let root = tempfile::tempdir().unwrap();
    let fake = Arc::new(FakeExtractor::new(Mode::Fail(
        "ERROR: Unsupported URL: not-a-url".to_string(),
    )));

    let response = app(fake, root.path())
        .oneshot(get("/api/playlist-info?url=not-a-url"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response.into_body()).await;
    assert_eq!(json["error"], true);
    assert!(json["message"].as_str().unwrap().contains("Unsupported URL"));
}

#[tokio::test]
async fn playlist_requires_url() {
    let root = tempfile::tempdir().unwrap();
    let response = app(Arc::new(FakeExtractor::new(Mode::Succeed)), root.path())
        .oneshot(get("/api/playlist-info"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response.into_body()).await;
    assert_eq!(json["error"], true);
}

#[tokio::test]
async fn download_streams_file_and_cleans_up() {
    let root = tempfile::tempdir().unwrap();
    let fake = Arc::new(FakeExtractor::new(Mode::Succeed));

    let response = app(fake.clone(), root.path())
        .oneshot(get("/api/download-video?video_id=abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Song CoolMix.mp4\""
    );
    let content_length: usize = headers[header::CONTENT_LENGTH].to_str().unwrap().parse().unwrap();

    // exactly one temp file while the body is pending
    assert_eq!(count_files(root.path()), 1);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), fake.payload.as_slice());
    assert_eq!(content_length, bytes.len());

    assert_eq!(count_entries(root.path()), 0);
    assert_eq!(
        fake.urls.lock().unwrap().as_slice(),
        ["https://www.youtube.com/watch?v=abc"]
    );
}

#[tokio::test]
async fn download_failure_is_500_and_cleans_up() {
    let root = tempfile::tempdir().unwrap();
    let fake = Arc::new(FakeExtractor::new(Mode::Fail(
        "ERROR: [youtube] zzz: Video unavailable".to_string(),
    )));

    let response = app(fake.clone(), root.path())
        .oneshot(get("/api/download-video?video_id=zzz"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response.into_body()).await;
    assert_eq!(json["error"], true);
    assert!(!json["message"].as_str().unwrap().is_empty());

    assert_eq!(fake.outputs.lock().unwrap().len(), 1);
    assert_eq!(count_entries(root.path()), 0);
}

#[tokio::test]
async fn download_missing_file_names_title() {
    let root = tempfile::tempdir().unwrap();
    let mut fake = FakeExtractor::new(Mode::SkipWrite);
    fake.title = Some("Lost Track".to_string());

    let response = app(Arc::new(fake), root.path())
        .oneshot(get("/api/download-video?video_id=abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response.into_body()).await;
    assert_eq!(json["error"], true);
    assert!(json["message"].as_str().unwrap().contains("Lost Track"));
    assert_eq!(count_entries(root.path()), 0);
}

#[tokio::test]
async fn download_requires_video_id() {
    let root = tempfile::tempdir().unwrap();
    let response = app(Arc::new(FakeExtractor::new(Mode::Succeed)), root.path())
        .oneshot(get("/api/download-video?video_id="))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(count_entries(root.path()), 0);
}

#[tokio::test]
async fn malformed_query_uses_envelope() {
    let root = tempfile::tempdir().unwrap();
    let fake = Arc::new(FakeExtractor::new(Mode::Succeed));

    for uri in [
        "/api/download-video?video_id=a&video_id=b",
        "/api/playlist-info?url=a&url=b",
    ] {
        let response = app(fake.clone(), root.path()).oneshot(get(uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let json = json_body(response.into_body()).await;
        assert_eq!(json["error"], true);
        assert!(json["message"].as_str().unwrap().contains("duplicate field"));
    }

    assert!(fake.urls.lock().unwrap().is_empty());
    assert_eq!(count_entries(root.path()), 0);
}

#[tokio::test]
async fn dropped_body_cleans_up() {
    let root = tempfile::tempdir().unwrap();
    let fake = Arc::new(FakeExtractor::new(Mode::Succeed));

    let response = app(fake, root.path())
        .oneshot(get("/api/download-video?video_id=abc"))
        .await
        .unwrap();
    assert_eq!(count_files(root.path()), 1);

    drop(response);
    assert_eq!(count_entries(root.path()), 0);
}

#[tokio::test]
async fn concurrent_downloads_use_distinct_paths() {
    let root = tempfile::tempdir().unwrap();
    let fake = Arc::new(FakeExtractor::new(Mode::Succeed));
    let app = app(fake.clone(), root.path());

    let mut handles = Vec::new();
    for i in 0..8 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let response = app
                .oneshot(get(&format!("/api/download-video?video_id=id{}", i)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            response.into_body().collect().await.unwrap().to_bytes()
        }));
    }
    for handle in handles {
        let bytes = handle.await.unwrap();
        assert_eq!(bytes.as_ref(), fake.payload.as_slice());
    }

    let outputs = fake.outputs.lock().unwrap().clone();
    let unique: std::collections::HashSet<_> = outputs.iter().collect();
    assert_eq!(outputs.len(), 8);
    assert_eq!(unique.len(), 8);
    assert_eq!(count_entries(root.path()), 0);
}

#[tokio::test]
async fn cors_allows_configured_origin_only() {
    let root = tempfile::tempdir().unwrap();
    let app = app(Arc::new(FakeExtractor::new(Mode::Succeed)), root.path());

    let preflight = |origin: &str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/playlist-info")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap()
    };

    let allowed = app.clone().oneshot(preflight(ORIGIN)).await.unwrap();
    assert_eq!(allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN);
    assert_eq!(allowed.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

    let denied = app.oneshot(preflight("http://evil.example")).await.unwrap();
    assert!(denied.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
