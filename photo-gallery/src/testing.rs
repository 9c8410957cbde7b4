//! In-memory collaborators for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::{CaptureOptions, CapturedPhoto, Directory};
use crate::platform::{
    BlobStore, CaptureError, CaptureProvider, Clock, Environment, EnvironmentDetector,
    FetchedBlob, KeyValueStore, ResourceFetcher, StorageError,
};

/// Blob store keyed by (directory, path). Native files use no directory.
#[derive(Default)]
pub struct MemoryBlobStore {
    files: Mutex<HashMap<(Option<Directory>, String), String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
    reads: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, directory: Directory, path: &str, data: &str) {
        self.lock()
            .insert((Some(directory), path.to_string()), data.to_string());
    }

    /// Places a file outside any storage scope, like a camera cache file
    pub fn insert_native(&self, path: &str, data: &str) {
        self.lock().insert((None, path.to_string()), data.to_string());
    }

    pub fn file(&self, directory: Option<Directory>, path: &str) -> Option<String> {
        self.lock().get(&(directory, path.to_string())).cloned()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(Option<Directory>, String), String>> {
        self.files.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn directory_root(directory: Directory) -> &'static str {
    match directory {
        Directory::Data => "/data",
        Directory::Cache => "/cache",
        Directory::Documents => "/documents",
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn write_file(
        &self,
        path: &str,
        data: &str,
        directory: Directory,
    ) -> Result<String, StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("disk full".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.insert(directory, path, data);
        Ok(format!("file://{}/{}", directory_root(directory), path))
    }

    async fn read_file(
        &self,
        path: &str,
        directory: Option<Directory>,
    ) -> Result<String, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.file(directory, path)
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn delete_file(&self, path: &str, directory: Directory) -> Result<(), StorageError> {
        self.lock()
            .remove(&(Some(directory), path.to_string()))
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }
}

#[derive(Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryPreferences {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("preferences are read-only".to_string()));
        }
        self.insert(key, value);
        Ok(())
    }
}

/// Camera that replays queued results in order
#[derive(Default)]
pub struct ScriptedCamera {
    results: Mutex<VecDeque<Result<CapturedPhoto, CaptureError>>>,
}

impl ScriptedCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, result: Result<CapturedPhoto, CaptureError>) {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(result);
    }
}

#[async_trait]
impl CaptureProvider for ScriptedCamera {
    async fn get_photo(&self, _options: &CaptureOptions) -> Result<CapturedPhoto, CaptureError> {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Err(CaptureError::Unavailable("no capture queued".to_string())))
    }
}

#[derive(Default)]
pub struct StaticFetcher {
    blobs: Mutex<HashMap<String, FetchedBlob>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: &str, bytes: Vec<u8>, mime: &str) {
        self.blobs.lock().unwrap_or_else(|e| e.into_inner()).insert(
            url.to_string(),
            FetchedBlob {
                bytes,
                mime: mime.to_string(),
            },
        );
    }
}

#[async_trait]
impl ResourceFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedBlob, StorageError> {
        self.blobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(url)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(url.to_string()))
    }
}

/// Clock that advances by `step` milliseconds on every reading
pub struct StepClock {
    next: AtomicI64,
    step: i64,
}

impl StepClock {
    pub fn starting_at(millis: i64, step: i64) -> Self {
        Self {
            next: AtomicI64::new(millis),
            step,
        }
    }

    pub fn fixed(millis: i64) -> Self {
        Self::starting_at(millis, 0)
    }
}

impl Clock for StepClock {
    fn now_millis(&self) -> i64 {
        self.next.fetch_add(self.step, Ordering::SeqCst)
    }
}

pub struct StaticEnvironment(pub Environment);

impl EnvironmentDetector for StaticEnvironment {
    fn environment(&self) -> Environment {
        self.0
    }
}
