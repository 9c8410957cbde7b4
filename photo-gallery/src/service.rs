use std::sync::Arc;

use crate::encoding::EncodingError;
use crate::models::{CaptureOptions, Directory, GalleryConfig, GalleryIndex, PhotoRecord};
use crate::platform::{
    BlobStore, CaptureError, CaptureProvider, Clock, Environment, EnvironmentDetector,
    KeyValueStore, ResourceFetcher, StorageError,
};
use crate::strategy::{select_strategy, PlatformStrategy};

/// Error type for photo gallery operations
#[derive(Debug)]
pub enum PhotoGalleryError {
    CaptureError(CaptureError),
    StorageError(StorageError),
    EncodingError(EncodingError),
    /// Persisted index could not be parsed
    CorruptIndex(serde_json::Error),
    SerializationError(serde_json::Error),
    /// Capture result lacks the reference the current environment needs
    MissingSource(String),
}

impl std::fmt::Display for PhotoGalleryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhotoGalleryError::CaptureError(e) => write!(f, "Capture error: {}", e),
            PhotoGalleryError::StorageError(e) => write!(f, "Storage error: {}", e),
            PhotoGalleryError::EncodingError(e) => write!(f, "Encoding error: {}", e),
            PhotoGalleryError::CorruptIndex(e) => write!(f, "Corrupt photo index: {}", e),
            PhotoGalleryError::SerializationError(e) => write!(f, "Serialization error: {}", e),
            PhotoGalleryError::MissingSource(msg) => write!(f, "Missing source: {}", msg),
        }
    }
}

impl std::error::Error for PhotoGalleryError {}

impl From<CaptureError> for PhotoGalleryError {
    fn from(err: CaptureError) -> Self {
        PhotoGalleryError::CaptureError(err)
    }
}

impl From<StorageError> for PhotoGalleryError {
    fn from(err: StorageError) -> Self {
        PhotoGalleryError::StorageError(err)
    }
}

impl From<EncodingError> for PhotoGalleryError {
    fn from(err: EncodingError) -> Self {
        PhotoGalleryError::EncodingError(err)
    }
}

/// Host capabilities a `GalleryStore` is assembled from
#[derive(Clone)]
pub struct Collaborators {
    pub camera: Arc<dyn CaptureProvider>,
    pub blobs: Arc<dyn BlobStore>,
    pub preferences: Arc<dyn KeyValueStore>,
    pub fetcher: Arc<dyn ResourceFetcher>,
    pub clock: Arc<dyn Clock>,
}

/// Photo gallery store
///
/// Owns the in-memory index. Both operations take `&mut self`, so a store
/// runs at most one capture or load at a time.
///
/// `persisted` mirrors the stored value as written; `photos` is what the
/// environment displays, which after a web load carries inline data URIs.
/// Only `persisted` is ever serialized.
pub struct GalleryStore {
    config: GalleryConfig,
    collaborators: Collaborators,
    strategy: Box<dyn PlatformStrategy>,
    persisted: GalleryIndex,
    photos: GalleryIndex,
}

impl GalleryStore {
    /// Builds a store, selecting the environment strategy once
    pub fn new(
        config: GalleryConfig,
        collaborators: Collaborators,
        detector: &dyn EnvironmentDetector,
    ) -> Self {
        let environment = detector.environment();
        log::debug!("Gallery store running in {} environment", environment);
        let strategy = select_strategy(environment, &config, collaborators.fetcher.clone());
        Self::with_strategy(config, collaborators, strategy)
    }

    pub fn with_strategy(
        config: GalleryConfig,
        collaborators: Collaborators,
        strategy: Box<dyn PlatformStrategy>,
    ) -> Self {
        Self {
            config,
            collaborators,
            strategy,
            persisted: GalleryIndex::new(),
            photos: GalleryIndex::new(),
        }
    }

    pub fn photos(&self) -> &GalleryIndex {
        &self.photos
    }

    pub fn environment(&self) -> Environment {
        self.strategy.environment()
    }

    /// Consumes the store and returns the in-memory index
    pub fn into_photos(self) -> GalleryIndex {
        self.photos
    }

    /// Derives a storage name from the clock, bumped past names already
    /// present in the index
    fn next_file_name(&self) -> String {
        let mut millis = self.collaborators.clock.now_millis();
        let mut name = self.config.file_name_for(millis);
        while self.persisted.contains_storage_path(&name) {
            millis += 1;
            name = self.config.file_name_for(millis);
        }
        name
    }

    /// Takes a photo, stores it and puts it at the front of the gallery.
    ///
    /// The blob is written first, then the would-be index is persisted, and
    /// only then is the in-memory index replaced. A failure at any step leaves
    /// both the persisted and the in-memory index as they were.
    pub async fn capture(&mut self) -> Result<PhotoRecord, PhotoGalleryError> {
        let photo = self
            .collaborators
            .camera
            .get_photo(&CaptureOptions::full_quality())
            .await?;
        log::debug!(
            "Captured photo: path={:?}, web_path={:?}",
            photo.path,
            photo.web_path
        );

        let file_name = self.next_file_name();
        let encoded = self
            .strategy
            .encode_capture(&photo, self.collaborators.blobs.as_ref())
            .await?;

        let saved_uri = self
            .collaborators
            .blobs
            .write_file(&file_name, encoded.payload(), Directory::Data)
            .await?;
        log::debug!("Stored {} ({}) at {}", file_name, encoded.mime(), saved_uri);

        let record = PhotoRecord::new(file_name, self.strategy.display_path(&photo, &saved_uri));

        let next = self.persisted.with_prepended(record.clone());
        let written = match next.to_json() {
            Ok(json) => self
                .collaborators
                .preferences
                .set(&self.config.storage_key, &json)
                .await
                .map_err(PhotoGalleryError::from),
            Err(e) => Err(PhotoGalleryError::SerializationError(e)),
        };

        if let Err(e) = written {
            self.discard_blob(&record.storage_path).await;
            return Err(e);
        }

        self.photos = self.photos.with_prepended(record.clone());
        self.persisted = next;
        log::info!(
            "Added photo {} ({} in gallery)",
            record.storage_path,
            self.photos.len()
        );
        Ok(record)
    }

    async fn discard_blob(&self, file_name: &str) {
        if let Err(e) = self
            .collaborators
            .blobs
            .delete_file(file_name, Directory::Data)
            .await
        {
            log::warn!("Could not remove orphaned photo {}: {}", file_name, e);
        }
    }

    /// Replaces the in-memory index with the persisted one.
    ///
    /// A missing or empty value loads as an empty gallery. Unparseable data and
    /// unreadable photos fail the whole call without touching memory.
    pub async fn load(&mut self) -> Result<&GalleryIndex, PhotoGalleryError> {
        let value = self
            .collaborators
            .preferences
            .get(&self.config.storage_key)
            .await?;

        let index = match value.as_deref() {
            None | Some("") => GalleryIndex::new(),
            Some(json) => GalleryIndex::from_json(json).map_err(|e| {
                log::error!("Persisted photo index is corrupt: {}", e);
                PhotoGalleryError::CorruptIndex(e)
            })?,
        };

        let display = self
            .strategy
            .rehydrate(index.clone(), self.collaborators.blobs.as_ref())
            .await?;

        self.persisted = index;
        self.photos = display;
        log::info!("Loaded {} photos", self.photos.len());
        Ok(&self.photos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CapturedPhoto;
    use crate::testing::{
        MemoryBlobStore, MemoryPreferences, ScriptedCamera, StaticEnvironment, StaticFetcher,
        StepClock,
    };

    struct Fixture {
        camera: Arc<ScriptedCamera>,
        blobs: Arc<MemoryBlobStore>,
        preferences: Arc<MemoryPreferences>,
        fetcher: Arc<StaticFetcher>,
        clock: Arc<StepClock>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                camera: Arc::new(ScriptedCamera::new()),
                blobs: Arc::new(MemoryBlobStore::new()),
                preferences: Arc::new(MemoryPreferences::new()),
                fetcher: Arc::new(StaticFetcher::new()),
                clock: Arc::new(StepClock::starting_at(1000, 1)),
            }
        }

        fn store(&self, environment: Environment) -> GalleryStore {
            let collaborators = Collaborators {
                camera: self.camera.clone(),
                blobs: self.blobs.clone(),
                preferences: self.preferences.clone(),
                fetcher: self.fetcher.clone(),
                clock: self.clock.clone(),
            };
            GalleryStore::new(
                GalleryConfig::default(),
                collaborators,
                &StaticEnvironment(environment),
            )
        }

        /// Queues a native capture whose bytes sit in the camera cache
        fn queue_native(&self, name: &str, data: &str) {
            let path = format!("/cache/{}", name);
            self.blobs.insert_native(&path, data);
            self.camera
                .push(Ok(CapturedPhoto::new(Some(path), Some(format!("blob:{}", name)))));
        }

        /// Queues a browser capture served from a blob URL
        fn queue_web(&self, name: &str, bytes: Vec<u8>) {
            let web_path = format!("blob:{}", name);
            self.fetcher.insert(&web_path, bytes, "image/jpeg");
            self.camera.push(Ok(CapturedPhoto::new(None, Some(web_path))));
        }
    }

    #[tokio::test]
    async fn test_hybrid_capture_scenario() {
        let fixture = Fixture::new();
        fixture.queue_native("a.jpg", "AQID");
        let mut store = fixture.store(Environment::Hybrid);

        let record = store.capture().await.unwrap();
        assert_eq!(record.storage_path, "1000.jpeg");
        assert_eq!(
            record.display_path.as_deref(),
            Some("https://localhost/_capacitor_file_/data/1000.jpeg")
        );
        assert_eq!(
            fixture.preferences.value("photos").unwrap(),
            r#"[{"filePath":"1000.jpeg","webViewPath":"https://localhost/_capacitor_file_/data/1000.jpeg"}]"#
        );
        assert_eq!(
            fixture.blobs.file(Some(Directory::Data), "1000.jpeg").as_deref(),
            Some("AQID")
        );
    }

    #[tokio::test]
    async fn test_capture_prepends_newest_first() {
        let fixture = Fixture::new();
        fixture.queue_native("a.jpg", "AQID");
        fixture.queue_native("b.jpg", "BAUG");
        let mut store = fixture.store(Environment::Hybrid);

        let a = store.capture().await.unwrap();
        let b = store.capture().await.unwrap();

        assert_eq!(store.photos().len(), 2);
        assert_eq!(store.photos().get(0), Some(&b));
        assert_eq!(store.photos().get(1), Some(&a));
        assert_ne!(a.storage_path, b.storage_path);
    }

    #[tokio::test]
    async fn test_same_millisecond_captures_get_distinct_names() {
        let fixture = Fixture {
            clock: Arc::new(StepClock::fixed(5000)),
            ..Fixture::new()
        };
        fixture.queue_native("a.jpg", "AQID");
        fixture.queue_native("b.jpg", "BAUG");
        let mut store = fixture.store(Environment::Hybrid);

        store.capture().await.unwrap();
        store.capture().await.unwrap();

        let names: Vec<_> = store.photos().iter().map(|r| r.storage_path.as_str()).collect();
        assert_eq!(names, vec!["5001.jpeg", "5000.jpeg"]);
    }

    #[tokio::test]
    async fn test_round_trip_in_same_environment() {
        let fixture = Fixture::new();
        for name in ["a.jpg", "b.jpg", "c.jpg"] {
            fixture.queue_native(name, "AQID");
        }
        let mut store = fixture.store(Environment::Hybrid);
        for _ in 0..3 {
            store.capture().await.unwrap();
        }
        let captured = store.photos().clone();

        let mut reloaded = fixture.store(Environment::Hybrid);
        let loaded = reloaded.load().await.unwrap();
        assert_eq!(loaded, &captured);
        let names: Vec<_> = loaded.iter().map(|r| r.storage_path.as_str()).collect();
        assert_eq!(names, vec!["1002.jpeg", "1001.jpeg", "1000.jpeg"]);
    }

    #[tokio::test]
    async fn test_web_capture_keeps_web_path_and_stores_bytes() {
        let fixture = Fixture::new();
        fixture.queue_web("cam-1", vec![1, 2, 3]);
        let mut store = fixture.store(Environment::Web);

        let record = store.capture().await.unwrap();
        assert_eq!(record.display_path.as_deref(), Some("blob:cam-1"));
        assert_eq!(
            fixture.blobs.file(Some(Directory::Data), "1000.jpeg").as_deref(),
            Some("AQID")
        );
    }

    #[tokio::test]
    async fn test_web_load_rebuilds_inline_data_uris() {
        let fixture = Fixture::new();
        fixture.blobs.insert(Directory::Data, "2.jpeg", "BAUG");
        fixture.blobs.insert(Directory::Data, "1.jpeg", "AQID");
        fixture.preferences.insert(
            "photos",
            r#"[{"filePath":"2.jpeg","webViewPath":"blob:old-2"},{"filePath":"1.jpeg","webViewPath":"blob:old-1"}]"#,
        );

        let mut store = fixture.store(Environment::Web);
        let loaded = store.load().await.unwrap().clone();

        assert_eq!(
            loaded.get(0).unwrap().display_path.as_deref(),
            Some("data:image/jpeg;base64,BAUG")
        );
        assert_eq!(
            loaded.get(1).unwrap().display_path.as_deref(),
            Some("data:image/jpeg;base64,AQID")
        );
    }

    #[tokio::test]
    async fn test_web_capture_after_load_persists_paths_as_written() {
        let fixture = Fixture::new();
        fixture.blobs.insert(Directory::Data, "1.jpeg", "AQID");
        fixture
            .preferences
            .insert("photos", r#"[{"filePath":"1.jpeg","webViewPath":"blob:old"}]"#);
        fixture.queue_web("new", vec![4, 5, 6]);

        let mut store = fixture.store(Environment::Web);
        store.load().await.unwrap();
        store.capture().await.unwrap();

        assert_eq!(
            fixture.preferences.value("photos").unwrap(),
            r#"[{"filePath":"1000.jpeg","webViewPath":"blob:new"},{"filePath":"1.jpeg","webViewPath":"blob:old"}]"#
        );
        assert_eq!(
            store.photos().get(1).unwrap().display_path.as_deref(),
            Some("data:image/jpeg;base64,AQID")
        );
        assert_eq!(
            store.photos().get(0).unwrap().display_path.as_deref(),
            Some("blob:new")
        );
    }

    #[tokio::test]
    async fn test_hybrid_load_leaves_display_paths_untouched() {
        let fixture = Fixture::new();
        fixture.blobs.insert(Directory::Data, "2.jpeg", "BAUG");
        let persisted = r#"[{"filePath":"2.jpeg","webViewPath":"https://localhost/_capacitor_file_/d/2.jpeg"},{"filePath":"1.jpeg"}]"#;
        fixture.preferences.insert("photos", persisted);

        let mut store = fixture.store(Environment::Hybrid);
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, &GalleryIndex::from_json(persisted).unwrap());
        assert_eq!(fixture.blobs.read_count(), 0);
    }

    #[tokio::test]
    async fn test_load_does_not_write_preferences() {
        let fixture = Fixture::new();
        fixture.blobs.insert(Directory::Data, "1.jpeg", "AQID");
        let persisted = r#"[{"filePath":"1.jpeg","webViewPath":"blob:1"}]"#;
        fixture.preferences.insert("photos", persisted);

        let mut store = fixture.store(Environment::Web);
        store.load().await.unwrap();
        assert_eq!(fixture.preferences.value("photos").as_deref(), Some(persisted));
    }

    #[tokio::test]
    async fn test_empty_cold_start() {
        let fixture = Fixture::new();
        let mut store = fixture.store(Environment::Web);
        assert!(store.load().await.unwrap().is_empty());

        fixture.preferences.insert("photos", "");
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_index_fails_load_and_keeps_memory() {
        let fixture = Fixture::new();
        fixture.queue_native("a.jpg", "AQID");
        let mut store = fixture.store(Environment::Hybrid);
        store.capture().await.unwrap();

        fixture.preferences.insert("photos", "[{\"filePath\":");
        let result = store.load().await;
        assert!(matches!(result, Err(PhotoGalleryError::CorruptIndex(_))));
        assert_eq!(store.photos().len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_photo_fails_whole_load() {
        let fixture = Fixture::new();
        fixture.blobs.insert(Directory::Data, "1.jpeg", "AQID");
        fixture.preferences.insert(
            "photos",
            r#"[{"filePath":"2.jpeg"},{"filePath":"1.jpeg"}]"#,
        );

        let mut store = fixture.store(Environment::Web);
        let result = store.load().await;
        assert!(matches!(result, Err(PhotoGalleryError::StorageError(_))));
        assert!(store.photos().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_capture_changes_nothing() {
        let fixture = Fixture::new();
        fixture
            .camera
            .push(Err(CaptureError::Cancelled("User cancelled photos app".to_string())));
        let mut store = fixture.store(Environment::Hybrid);

        let result = store.capture().await;
        assert!(matches!(
            result,
            Err(PhotoGalleryError::CaptureError(CaptureError::Cancelled(_)))
        ));
        assert!(store.photos().is_empty());
        assert_eq!(fixture.blobs.write_count(), 0);
        assert_eq!(fixture.preferences.value("photos"), None);
    }

    #[tokio::test]
    async fn test_blob_write_failure_leaves_index_unchanged() {
        let fixture = Fixture::new();
        fixture.queue_native("a.jpg", "AQID");
        fixture.queue_native("b.jpg", "BAUG");
        let mut store = fixture.store(Environment::Hybrid);
        store.capture().await.unwrap();
        let before = fixture.preferences.value("photos");

        fixture.blobs.set_fail_writes(true);
        let result = store.capture().await;

        assert!(matches!(result, Err(PhotoGalleryError::StorageError(_))));
        assert_eq!(fixture.preferences.value("photos"), before);
        assert_eq!(store.photos().len(), 1);
    }

    #[tokio::test]
    async fn test_preferences_failure_discards_blob() {
        let fixture = Fixture::new();
        fixture.queue_native("a.jpg", "AQID");
        fixture.preferences.set_fail_writes(true);
        let mut store = fixture.store(Environment::Hybrid);

        let result = store.capture().await;
        assert!(matches!(result, Err(PhotoGalleryError::StorageError(_))));
        assert!(store.photos().is_empty());
        assert_eq!(fixture.blobs.file(Some(Directory::Data), "1000.jpeg"), None);
    }

    #[tokio::test]
    async fn test_web_capture_without_web_path_is_rejected() {
        let fixture = Fixture::new();
        fixture
            .camera
            .push(Ok(CapturedPhoto::new(Some("/cache/x.jpg".to_string()), None)));
        let mut store = fixture.store(Environment::Web);

        let result = store.capture().await;
        assert!(matches!(result, Err(PhotoGalleryError::MissingSource(_))));
        assert_eq!(fixture.blobs.write_count(), 0);
    }
}
