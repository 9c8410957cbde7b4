use serde::{Deserialize, Serialize};

use crate::file_src::FileSrcConverter;

/// One entry of the gallery index.
///
/// Field names on disk are `filePath` / `webViewPath`; the persisted index is
/// shared with earlier releases of the app, so they must not change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhotoRecord {
    /// Name of the stored image inside the data directory
    #[serde(rename = "filePath")]
    pub storage_path: String,
    /// URI a display surface can load directly
    #[serde(
        rename = "webViewPath",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_path: Option<String>,
}

impl PhotoRecord {
    pub fn new(storage_path: impl Into<String>, display_path: Option<String>) -> Self {
        Self {
            storage_path: storage_path.into(),
            display_path,
        }
    }
}

/// Ordered gallery index, newest photo first
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct GalleryIndex(Vec<PhotoRecord>);

impl GalleryIndex {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&PhotoRecord> {
        self.0.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PhotoRecord> {
        self.0.iter()
    }

    pub fn contains_storage_path(&self, storage_path: &str) -> bool {
        self.0.iter().any(|r| r.storage_path == storage_path)
    }

    /// Returns the index that results from putting `record` in front,
    /// leaving `self` untouched until the caller decides to commit it.
    pub fn with_prepended(&self, record: PhotoRecord) -> Self {
        let mut records = Vec::with_capacity(self.0.len() + 1);
        records.push(record);
        records.extend(self.0.iter().cloned());
        Self(records)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl From<Vec<PhotoRecord>> for GalleryIndex {
    fn from(records: Vec<PhotoRecord>) -> Self {
        Self(records)
    }
}

impl IntoIterator for GalleryIndex {
    type Item = PhotoRecord;
    type IntoIter = std::vec::IntoIter<PhotoRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a GalleryIndex {
    type Item = &'a PhotoRecord;
    type IntoIter = std::slice::Iter<'a, PhotoRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Result of a camera capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPhoto {
    /// Native file reference (hybrid runtimes only)
    pub path: Option<String>,
    /// Path the web view can fetch the image from
    pub web_path: Option<String>,
}

impl CapturedPhoto {
    pub fn new(path: Option<String>, web_path: Option<String>) -> Self {
        Self { path, web_path }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraSource {
    Prompt,
    Camera,
    Photos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraResultType {
    Uri,
    Base64,
    DataUrl,
}

/// Parameters passed to the capture provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOptions {
    /// JPEG quality, 0-100
    pub quality: u8,
    pub source: CameraSource,
    pub result_type: CameraResultType,
}

impl CaptureOptions {
    /// Full quality camera shot returned by reference
    pub fn full_quality() -> Self {
        Self {
            quality: 100,
            source: CameraSource::Camera,
            result_type: CameraResultType::Uri,
        }
    }
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self::full_quality()
    }
}

/// Storage scope of the blob store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directory {
    /// Application-private data directory
    Data,
    Cache,
    Documents,
}

/// Configuration for the gallery store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryConfig {
    /// Key of the persisted index in the key-value store
    pub storage_key: String,
    /// Suffix appended to the capture timestamp
    pub file_extension: String,
    /// MIME type used for inline data URIs
    pub mime_type: String,
    pub file_src: FileSrcConverter,
}

impl GalleryConfig {
    pub fn file_name_for(&self, millis: i64) -> String {
        format!("{}.{}", millis, self.file_extension)
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            storage_key: "photos".to_string(),
            file_extension: "jpeg".to_string(),
            mime_type: "image/jpeg".to_string(),
            file_src: FileSrcConverter::default(),
        }
    }
}
