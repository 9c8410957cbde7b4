use crate::filesystem::path_from_file_uri;
use async_trait::async_trait;
use photo_gallery::{FetchedBlob, ResourceFetcher, StorageError};
use std::path::Path;

/// Guesses a MIME type from the file extension
pub fn guess_mime_from_ext(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("heic") | Some("heif") => "image/heic",
        _ => "image/jpeg",
    }
}

/// Fetches web paths over HTTP(S); `file://` URIs and plain paths are read
/// from disk.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    async fn fetch_http(&self, url: &str) -> Result<FetchedBlob, StorageError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(StorageError::Unavailable(format!(
                "Fetching {} returned {}",
                url, status
            )));
        }

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_else(|| guess_mime_from_ext(Path::new(url)).to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StorageError::Unavailable(format!("Reading body failed: {}", e)))?;

        Ok(FetchedBlob {
            bytes: bytes.to_vec(),
            mime,
        })
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedBlob, StorageError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return self.fetch_http(url).await;
        }

        let path = path_from_file_uri(url);
        log::debug!("Reading web path {:?} from disk", path);
        let bytes = tokio::fs::read(&path).await?;
        Ok(FetchedBlob {
            mime: guess_mime_from_ext(&path).to_string(),
            bytes,
        })
    }
}
