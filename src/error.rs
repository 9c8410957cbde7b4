use photo_gallery::{CaptureError, PhotoGalleryError, StorageError};
use std::fmt;

/// Central error types for the gallery host
#[derive(Debug)]
pub enum AppError {
    /// Database error (rusqlite)
    Database(rusqlite::Error),
    /// Filesystem error
    Filesystem(std::io::Error),
    /// Configuration could not be read or parsed
    Config(String),
    /// Permission denied (e.g. camera)
    PermissionDenied(String),
    /// Error reported by the gallery store
    Gallery(PhotoGalleryError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::Filesystem(e) => write!(f, "Filesystem error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            AppError::Gallery(e) => write!(f, "Gallery error: {}", e),
        }
    }
}

impl std::error::Error for AppError {}

// Conversions from other error types
impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Filesystem(e)
    }
}

impl From<toml::de::Error> for AppError {
    fn from(e: toml::de::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<PhotoGalleryError> for AppError {
    fn from(e: PhotoGalleryError) -> Self {
        match e {
            PhotoGalleryError::CaptureError(CaptureError::PermissionDenied(msg)) => {
                AppError::PermissionDenied(msg)
            }
            other => AppError::Gallery(other),
        }
    }
}

/// User-friendly error messages for UI
impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(_) => "A database error occurred. Please try again.".to_string(),
            AppError::Filesystem(_) => {
                "Error accessing files. Please check app permissions.".to_string()
            }
            AppError::Config(msg) => format!("Invalid configuration: {}", msg),
            AppError::PermissionDenied(msg) => format!("Permission required: {}", msg),
            AppError::Gallery(PhotoGalleryError::CaptureError(CaptureError::Cancelled(_))) => {
                "No photo was taken.".to_string()
            }
            AppError::Gallery(PhotoGalleryError::CaptureError(_)) => {
                "The camera is not available.".to_string()
            }
            AppError::Gallery(PhotoGalleryError::CorruptIndex(_)) => {
                "The saved gallery could not be read.".to_string()
            }
            AppError::Gallery(PhotoGalleryError::StorageError(StorageError::NotFound(_))) => {
                "A saved photo is missing.".to_string()
            }
            AppError::Gallery(_) => "Error saving or loading photos.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_is_lifted() {
        let err: AppError =
            PhotoGalleryError::CaptureError(CaptureError::PermissionDenied("camera".into())).into();
        assert!(matches!(err, AppError::PermissionDenied(_)));
        assert_eq!(err.user_message(), "Permission required: camera");
    }

    #[test]
    fn test_cancelled_capture_message() {
        let err: AppError =
            PhotoGalleryError::CaptureError(CaptureError::Cancelled("back pressed".into())).into();
        assert_eq!(err.user_message(), "No photo was taken.");
    }
}
