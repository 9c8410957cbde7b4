//! Environment-specific encoding and display-path rules.
//!
//! Hybrid shells read captures back from the native filesystem and display
//! them through rewritten file URIs. Browsers fetch the capture from its web
//! path and rebuild inline data URIs from the blob store on every load.

use std::sync::Arc;

use async_trait::async_trait;

use crate::encoding::{data_url, read_as_data_url, EncodedImage};
use crate::file_src::FileSrcConverter;
use crate::models::{CapturedPhoto, Directory, GalleryConfig, GalleryIndex, PhotoRecord};
use crate::platform::{BlobStore, Environment, ResourceFetcher};
use crate::service::PhotoGalleryError;

#[async_trait]
pub trait PlatformStrategy: Send + Sync {
    fn environment(&self) -> Environment;

    /// Produces the base64 encoding of a fresh capture
    async fn encode_capture(
        &self,
        photo: &CapturedPhoto,
        blobs: &dyn BlobStore,
    ) -> Result<EncodedImage, PhotoGalleryError>;

    /// Display path stored with a capture; `saved_uri` is the native URI the
    /// blob store returned for the written file
    fn display_path(&self, photo: &CapturedPhoto, saved_uri: &str) -> Option<String>;

    /// Makes a freshly deserialized index displayable
    async fn rehydrate(
        &self,
        index: GalleryIndex,
        blobs: &dyn BlobStore,
    ) -> Result<GalleryIndex, PhotoGalleryError>;
}

pub struct HybridStrategy {
    file_src: FileSrcConverter,
    mime_type: String,
}

impl HybridStrategy {
    pub fn new(config: &GalleryConfig) -> Self {
        Self {
            file_src: config.file_src.clone(),
            mime_type: config.mime_type.clone(),
        }
    }
}

#[async_trait]
impl PlatformStrategy for HybridStrategy {
    fn environment(&self) -> Environment {
        Environment::Hybrid
    }

    async fn encode_capture(
        &self,
        photo: &CapturedPhoto,
        blobs: &dyn BlobStore,
    ) -> Result<EncodedImage, PhotoGalleryError> {
        let path = photo.path.as_deref().ok_or_else(|| {
            PhotoGalleryError::MissingSource("capture has no native file path".to_string())
        })?;

        log::debug!("Reading native capture {}", path);
        let data = blobs.read_file(path, None).await?;
        Ok(EncodedImage::from_base64(self.mime_type.clone(), data))
    }

    fn display_path(&self, _photo: &CapturedPhoto, saved_uri: &str) -> Option<String> {
        Some(self.file_src.convert(saved_uri))
    }

    async fn rehydrate(
        &self,
        index: GalleryIndex,
        _blobs: &dyn BlobStore,
    ) -> Result<GalleryIndex, PhotoGalleryError> {
        // Persisted display paths point at stable files and stay valid.
        Ok(index)
    }
}

pub struct WebStrategy {
    fetcher: Arc<dyn ResourceFetcher>,
    mime_type: String,
}

impl WebStrategy {
    pub fn new(config: &GalleryConfig, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self {
            fetcher,
            mime_type: config.mime_type.clone(),
        }
    }
}

#[async_trait]
impl PlatformStrategy for WebStrategy {
    fn environment(&self) -> Environment {
        Environment::Web
    }

    async fn encode_capture(
        &self,
        photo: &CapturedPhoto,
        _blobs: &dyn BlobStore,
    ) -> Result<EncodedImage, PhotoGalleryError> {
        let web_path = photo.web_path.as_deref().ok_or_else(|| {
            PhotoGalleryError::MissingSource("capture has no web path".to_string())
        })?;

        log::debug!("Fetching capture from {}", web_path);
        let blob = self.fetcher.fetch(web_path).await?;
        let mime = if blob.mime.is_empty() {
            self.mime_type.clone()
        } else {
            blob.mime
        };

        let url = read_as_data_url(blob.bytes, mime).await?;
        Ok(EncodedImage::from_data_url(&url)?)
    }

    fn display_path(&self, photo: &CapturedPhoto, _saved_uri: &str) -> Option<String> {
        // Already resident in the browser, no need to read it back.
        photo.web_path.clone()
    }

    async fn rehydrate(
        &self,
        index: GalleryIndex,
        blobs: &dyn BlobStore,
    ) -> Result<GalleryIndex, PhotoGalleryError> {
        let mut records = Vec::with_capacity(index.len());
        for record in index {
            let data = blobs
                .read_file(&record.storage_path, Some(Directory::Data))
                .await
                .map_err(|e| {
                    log::error!("Failed to read {}: {}", record.storage_path, e);
                    e
                })?;

            records.push(PhotoRecord {
                display_path: Some(data_url(&self.mime_type, &data)),
                storage_path: record.storage_path,
            });
        }
        Ok(GalleryIndex::from(records))
    }
}

/// Picks the strategy for `environment`. Called once when the store is built.
pub fn select_strategy(
    environment: Environment,
    config: &GalleryConfig,
    fetcher: Arc<dyn ResourceFetcher>,
) -> Box<dyn PlatformStrategy> {
    match environment {
        Environment::Hybrid => Box::new(HybridStrategy::new(config)),
        Environment::Web => Box::new(WebStrategy::new(config, fetcher)),
    }
}
