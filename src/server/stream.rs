// Streaming a finished download back to the client

use axum::body::Body;
use futures_util::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::downloader::TempDownload;

/// 1 MiB read chunks
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Open the merged file and turn it into a response body.
///
/// The body owns `temp`: the directory is removed when the stream reaches EOF
/// or when the body is dropped. hyper stops polling once Content-Length bytes
/// are written, so a served response normally ends in the drop.
pub async fn file_body(mut temp: TempDownload) -> std::io::Result<Body> {
    let file = match tokio::fs::File::open(temp.file_path()).await {
        Ok(file) => file,
        Err(e) => {
            temp.cleanup().await;
            return Err(e);
        }
    };

    let stream = async_stream::stream! {
        let mut temp = temp;
        let mut chunks = ReaderStream::with_capacity(file, CHUNK_SIZE);
        let mut sent = 0u64;

        while let Some(chunk) = chunks.next().await {
            if let Ok(bytes) = &chunk {
                sent += bytes.len() as u64;
            }
            let failed = chunk.is_err();
            yield chunk;
            if failed {
                break;
            }
        }

        drop(chunks);
        debug!(bytes = sent, "stream finished");
        temp.cleanup().await;
    };

    Ok(Body::from_stream(stream))
}
