//! Host capabilities the gallery store is built on.
//!
//! The store never talks to a camera, filesystem or preference store directly.
//! Applications hand in implementations of these traits; the host crate ships
//! the filesystem, SQLite and camera bridges, and `testing` has in-memory ones.

use async_trait::async_trait;

use crate::models::{CaptureOptions, CapturedPhoto, Directory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// User dismissed the camera
    Cancelled(String),
    PermissionDenied(String),
    Timeout(String),
    /// No camera on this platform
    Unavailable(String),
    Other(String),
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::Cancelled(msg) => write!(f, "Cancelled: {}", msg),
            CaptureError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            CaptureError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            CaptureError::Unavailable(msg) => write!(f, "Camera unavailable: {}", msg),
            CaptureError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for CaptureError {}

/// Error type shared by the blob, key-value and fetch collaborators
#[derive(Debug)]
pub enum StorageError {
    NotFound(String),
    IoError(std::io::Error),
    InvalidData(String),
    Unavailable(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
            StorageError::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
            StorageError::Unavailable(msg) => write!(f, "Storage unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(err.to_string())
        } else {
            StorageError::IoError(err)
        }
    }
}

/// Runtime the app is hosted in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Native device shell with a real filesystem
    Hybrid,
    /// Plain web browser context
    Web,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Hybrid => write!(f, "hybrid"),
            Environment::Web => write!(f, "web"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hybrid" | "native" => Ok(Environment::Hybrid),
            "web" | "browser" => Ok(Environment::Web),
            other => Err(format!("unknown environment: {}", other)),
        }
    }
}

#[async_trait]
pub trait CaptureProvider: Send + Sync {
    async fn get_photo(&self, options: &CaptureOptions) -> Result<CapturedPhoto, CaptureError>;
}

/// Private file storage. Data crosses this boundary as base64.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Decodes `data` and writes it to `path` inside `directory`.
    /// Returns the native URI of the written file.
    async fn write_file(
        &self,
        path: &str,
        data: &str,
        directory: Directory,
    ) -> Result<String, StorageError>;

    /// Reads a file as base64. Without a directory, `path` is a native
    /// file reference (absolute path or `file://` URI).
    async fn read_file(
        &self,
        path: &str,
        directory: Option<Directory>,
    ) -> Result<String, StorageError>;

    async fn delete_file(&self, path: &str, directory: Directory) -> Result<(), StorageError>;
}

/// Durable store for small string values
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Binary blob fetched from a web path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBlob {
    pub bytes: Vec<u8>,
    pub mime: String,
}

#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedBlob, StorageError>;
}

pub trait EnvironmentDetector: Send + Sync {
    fn environment(&self) -> Environment;
}

pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
