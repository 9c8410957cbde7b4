use crate::error::AppError;
use crate::filesystem::get_app_data_dir;
use photo_gallery::{Environment, FileSrcConverter, GalleryConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration, read from `gallery.toml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub app_id: String,
    pub app_name: String,
    pub web_dir: String,
    /// Overrides the platform data directory
    pub data_dir: Option<PathBuf>,
    /// Forces `hybrid` or `web` instead of detecting the runtime
    pub platform: Option<String>,
    pub server: ServerConfig,
    pub gallery: GallerySettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub android_scheme: String,
    pub hostname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GallerySettings {
    pub storage_key: String,
    pub file_extension: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_id: "io.ionic.starter".to_string(),
            app_name: "photo-galary".to_string(),
            web_dir: "www".to_string(),
            data_dir: None,
            platform: None,
            server: ServerConfig::default(),
            gallery: GallerySettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            android_scheme: "https".to_string(),
            hostname: "localhost".to_string(),
        }
    }
}

impl Default for GallerySettings {
    fn default() -> Self {
        let defaults = GalleryConfig::default();
        Self {
            storage_key: defaults.storage_key,
            file_extension: defaults.file_extension,
            mime_type: defaults.mime_type,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads the config file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, AppError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {:?}, using defaults", path);
                Ok(Self::default())
            }
            Err(e) => Err(AppError::Filesystem(e)),
        }
    }

    pub fn gallery_config(&self) -> GalleryConfig {
        GalleryConfig {
            storage_key: self.gallery.storage_key.clone(),
            file_extension: self.gallery.file_extension.clone(),
            mime_type: self.gallery.mime_type.clone(),
            file_src: FileSrcConverter::new(&self.server.android_scheme, &self.server.hostname),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(get_app_data_dir)
    }

    /// Photos live directly in the data directory
    pub fn photo_dir(&self) -> PathBuf {
        self.data_dir()
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join("preferences.db")
    }

    pub fn environment_override(&self) -> Result<Option<Environment>, AppError> {
        self.platform
            .as_deref()
            .map(|p| p.parse::<Environment>().map_err(AppError::Config))
            .transpose()
    }
}
