use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use photo_gallery::encoding::decode_base64;
use photo_gallery::{BlobStore, Directory, StorageError};
use std::path::{Path, PathBuf};

#[cfg(target_os = "android")]
fn android_files_dir() -> Option<PathBuf> {
    use jni::{objects::{JObject, JString}, JavaVM};
    unsafe {
        let ctx = ndk_context::android_context();
        let vm = JavaVM::from_raw(ctx.vm().cast()).ok()?;
        let mut env = vm.attach_current_thread().ok()?; // mutable for JNI calls
        let activity = JObject::from_raw(ctx.context().cast());
        let files_dir = env
            .call_method(activity, "getFilesDir", "()Ljava/io/File;", &[])
            .ok()?
            .l()
            .ok()?;
        let abs_path_obj = env
            .call_method(files_dir, "getAbsolutePath", "()Ljava/lang/String;", &[])
            .ok()?
            .l()
            .ok()?;
        let abs_path_jstring: JString = JString::from(abs_path_obj);
        let abs_path: String = env.get_string(&abs_path_jstring).ok()?.into();
        Some(PathBuf::from(abs_path))
    }
}

/// Get the app data directory for the current platform
pub fn get_app_data_dir() -> PathBuf {
    #[cfg(target_os = "android")]
    {
        if let Some(dir) = android_files_dir() { return dir; }
        PathBuf::from("/data/data/io.ionic.starter/files")
    }

    #[cfg(not(target_os = "android"))]
    {
        PathBuf::from("./data")
    }
}

/// Turns a native file reference (`file://` URI or plain path) into a path
pub fn path_from_file_uri(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix("file://").unwrap_or(uri))
}

pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Blob store on the local filesystem.
///
/// Every storage scope maps to a directory below `root`; data is decoded
/// from base64 on write and encoded on read.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn directory_path(&self, directory: Directory) -> PathBuf {
        match directory {
            Directory::Data => self.root.clone(),
            Directory::Cache => self.root.join("cache"),
            Directory::Documents => self.root.join("documents"),
        }
    }

    fn resolve(&self, path: &str, directory: Option<Directory>) -> Result<PathBuf, StorageError> {
        match directory {
            Some(directory) => {
                let relative = Path::new(path);
                if relative.is_absolute()
                    || relative
                        .components()
                        .any(|c| matches!(c, std::path::Component::ParentDir))
                {
                    return Err(StorageError::InvalidData(format!(
                        "path escapes storage directory: {}",
                        path
                    )));
                }
                Ok(self.directory_path(directory).join(relative))
            }
            None => Ok(path_from_file_uri(path)),
        }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn write_file(
        &self,
        path: &str,
        data: &str,
        directory: Directory,
    ) -> Result<String, StorageError> {
        let target = self.resolve(path, Some(directory))?;
        let bytes = decode_base64(data).map_err(|e| StorageError::InvalidData(e.to_string()))?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;

        let absolute = match tokio::fs::canonicalize(&target).await {
            Ok(p) => p,
            Err(_) => target,
        };
        log::debug!("Wrote {:?}", absolute);
        Ok(file_uri(&absolute))
    }

    async fn read_file(
        &self,
        path: &str,
        directory: Option<Directory>,
    ) -> Result<String, StorageError> {
        let source = self.resolve(path, directory)?;
        let bytes = tokio::fs::read(&source).await?;
        Ok(general_purpose::STANDARD.encode(bytes))
    }

    async fn delete_file(&self, path: &str, directory: Directory) -> Result<(), StorageError> {
        let target = self.resolve(path, Some(directory))?;
        tokio::fs::remove_file(&target).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_decodes_base64() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        let uri = store
            .write_file("1000.jpeg", "/9j/", Directory::Data)
            .await
            .unwrap();
        assert!(uri.starts_with("file://"));
        assert!(uri.ends_with("1000.jpeg"));

        let bytes = std::fs::read(dir.path().join("1000.jpeg")).unwrap();
        assert_eq!(bytes, vec![0xff, 0xd8, 0xff]);
    }

    #[tokio::test]
    async fn test_read_by_scope_and_by_uri() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        let uri = store
            .write_file("a.jpeg", "AQID", Directory::Data)
            .await
            .unwrap();

        assert_eq!(
            store.read_file("a.jpeg", Some(Directory::Data)).await.unwrap(),
            "AQID"
        );
        assert_eq!(store.read_file(&uri, None).await.unwrap(), "AQID");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        let result = store.read_file("nope.jpeg", Some(Directory::Data)).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rejects_invalid_base64_and_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        let result = store.write_file("a.jpeg", "%%%", Directory::Data).await;
        assert!(matches!(result, Err(StorageError::InvalidData(_))));

        let result = store.write_file("../a.jpeg", "AQID", Directory::Data).await;
        assert!(matches!(result, Err(StorageError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_delete_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        store
            .write_file("a.jpeg", "AQID", Directory::Cache)
            .await
            .unwrap();
        assert!(dir.path().join("cache/a.jpeg").exists());

        store.delete_file("a.jpeg", Directory::Cache).await.unwrap();
        assert!(!dir.path().join("cache/a.jpeg").exists());
    }

    #[cfg(not(target_os = "android"))]
    #[test]
    fn test_desktop_data_dir() {
        assert_eq!(get_app_data_dir(), PathBuf::from("./data"));
    }

    #[test]
    fn test_path_from_file_uri() {
        assert_eq!(path_from_file_uri("file:///tmp/a.jpeg"), PathBuf::from("/tmp/a.jpeg"));
        assert_eq!(path_from_file_uri("/tmp/a.jpeg"), PathBuf::from("/tmp/a.jpeg"));
    }
}
