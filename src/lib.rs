//! Device adapters and app wiring for the photo gallery.
//!
//! `photo-gallery` holds the capture/load logic; this crate supplies what it
//! runs on: the camera bridge, file storage under the app data directory,
//! preferences in SQLite, a fetcher for web paths and the runtime detector.
//! [`GalleryContext`] ties them together for the UI layer.

pub mod camera;
pub mod config;
pub mod environment;
pub mod error;
pub mod fetch;
pub mod filesystem;
pub mod gallery;
pub mod logging;
pub mod preferences;

pub use config::AppConfig;
pub use error::AppError;
pub use gallery::GalleryContext;
pub use logging::init_logging;
