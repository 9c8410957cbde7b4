//! # Photo Gallery
//!
//! Capture, persistence and rehydration of a photo gallery for apps that run
//! both inside a native shell ("hybrid") and in a plain browser ("web").
//!
//! This crate provides:
//! - The gallery index and its persisted JSON format
//! - Base64 and data URL encoding of captured images
//! - Environment strategies that decide how captures are encoded and displayed
//! - `GalleryStore`, which captures, stores and reloads photos
//!
//! ## Platform Separation
//!
//! Camera, file storage and preferences are reached through the traits in
//! [`platform`]. Implementations for real devices live in the application crate.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use photo_gallery::{Collaborators, GalleryConfig, GalleryStore};
//!
//! let mut store = GalleryStore::new(GalleryConfig::default(), collaborators, &detector);
//! store.load().await?;
//! let newest = store.capture().await?;
//! ```

pub mod encoding;
pub mod file_src;
pub mod models;
pub mod platform;
pub mod service;
pub mod strategy;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use encoding::{EncodedImage, EncodingError};
pub use file_src::FileSrcConverter;
pub use models::{
    CameraResultType, CameraSource, CaptureOptions, CapturedPhoto, Directory, GalleryConfig,
    GalleryIndex, PhotoRecord,
};
pub use platform::{
    BlobStore, CaptureError, CaptureProvider, Clock, Environment, EnvironmentDetector,
    FetchedBlob, KeyValueStore, ResourceFetcher, StorageError, SystemClock,
};
pub use service::{Collaborators, GalleryStore, PhotoGalleryError};
pub use strategy::{select_strategy, HybridStrategy, PlatformStrategy, WebStrategy};
