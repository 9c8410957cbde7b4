use crate::camera::{AndroidCameraConfig, NativeCamera};
use crate::config::AppConfig;
use crate::environment::PlatformDetector;
use crate::error::AppError;
use crate::fetch::HttpFetcher;
use crate::filesystem::FsBlobStore;
use crate::logging::init_logging;
use crate::preferences::SqlitePreferences;
use photo_gallery::{
    CaptureProvider, Collaborators, GalleryIndex, GalleryStore, PhotoRecord, SystemClock,
};
use std::path::Path;
use std::sync::Arc;

/// Owns the gallery store and the host resources behind it.
///
/// Created by whoever handles UI events and passed along explicitly.
pub struct GalleryContext {
    store: GalleryStore,
    preferences: Arc<SqlitePreferences>,
}

impl GalleryContext {
    /// App startup: reads `config_path` (defaults when absent), installs the
    /// logger and opens the device gallery
    pub async fn open_from(config_path: &Path) -> Result<Self, AppError> {
        let config = AppConfig::load(config_path)?;
        init_logging(&config.logging);
        log::debug!("Using config {:?}", config_path);
        Self::open(&config).await
    }

    /// Opens the device gallery with the native camera and loads saved photos
    pub async fn open(config: &AppConfig) -> Result<Self, AppError> {
        let camera = NativeCamera::new(AndroidCameraConfig::default());
        Self::open_with_camera(config, Arc::new(camera)).await
    }

    pub async fn open_with_camera(
        config: &AppConfig,
        camera: Arc<dyn CaptureProvider>,
    ) -> Result<Self, AppError> {
        let photo_dir = config.photo_dir();
        std::fs::create_dir_all(&photo_dir)?;

        let preferences = Arc::new(SqlitePreferences::open(&config.database_path())?);
        let detector = PlatformDetector::new(config.environment_override()?);

        let collaborators = Collaborators {
            camera,
            blobs: Arc::new(FsBlobStore::new(photo_dir)),
            preferences: preferences.clone(),
            fetcher: Arc::new(HttpFetcher::default()),
            clock: Arc::new(SystemClock),
        };
        let mut store = GalleryStore::new(config.gallery_config(), collaborators, &detector);

        let loaded = store.load().await?.len();
        log::info!(
            "Opened gallery for {} ({} environment, {} photos)",
            config.app_name,
            store.environment(),
            loaded
        );

        Ok(Self { store, preferences })
    }

    pub fn photos(&self) -> &GalleryIndex {
        self.store.photos()
    }

    /// Handles the "take photo" action
    pub async fn add_new_to_gallery(&mut self) -> Result<PhotoRecord, AppError> {
        Ok(self.store.capture().await?)
    }

    /// Re-reads the gallery from storage
    pub async fn reload(&mut self) -> Result<&GalleryIndex, AppError> {
        Ok(self.store.load().await?)
    }

    /// Releases the store and closes the preferences database
    pub fn close(self) -> Result<GalleryIndex, AppError> {
        let Self { store, preferences } = self;
        let photos = store.into_photos();
        match Arc::try_unwrap(preferences) {
            Ok(preferences) => preferences.close()?,
            Err(_) => log::debug!("Preferences still shared, closing on drop"),
        }
        Ok(photos)
    }
}
