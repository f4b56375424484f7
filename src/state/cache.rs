use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use super::data::{image_list_from_json, image_list_to_json, ImageEntry};
use crate::error::CacheError;

/// Key holding the JSON-encoded displayed image list
pub const IMAGES_KEY: &str = "images";

/// A minimal string key/value store used as the local cache.
///
/// Reads and writes are synchronous so a controller mutation can update
/// memory and cache without yielding in between.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), CacheError>;
}

/// Stores each key as `<dir>/<key>.json`
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        info!("📁 Cache initialized at: {}", dir.display());
        Ok(Self { dir })
    }

    /// Default cache directory for the collage:
    /// - Linux: ~/.cache/live-collage
    /// - macOS: ~/Library/Caches/live-collage
    /// - Windows: %LOCALAPPDATA%\live-collage
    pub fn default_dir() -> Option<PathBuf> {
        let mut path = dirs::cache_dir().or_else(dirs::home_dir)?;
        path.push("live-collage");
        Some(path)
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        // Write to a sibling file and rename so a crash never leaves half a value
        let path = self.key_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore").field("dir", &self.dir).finish()
    }
}

/// Process-local store, used when no cache directory is available and in tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed view of the cached image list
pub struct ImageCache {
    store: Box<dyn KeyValueStore>,
}

impl ImageCache {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Cache backed by `dir`, or by memory if the directory is unusable
    pub fn open_or_memory(dir: Option<PathBuf>) -> Self {
        match dir.map(FileStore::open) {
            Some(Ok(store)) => Self::new(Box::new(store)),
            Some(Err(e)) => {
                warn!("⚠️  Cache directory unusable ({}), caching in memory only", e);
                Self::new(Box::new(MemoryStore::default()))
            }
            None => {
                warn!("⚠️  No cache directory found, caching in memory only");
                Self::new(Box::new(MemoryStore::default()))
            }
        }
    }

    /// Read the cached list. A missing value is an empty list.
    pub fn load(&self) -> Result<Vec<ImageEntry>, CacheError> {
        let Some(json) = self.store.get(IMAGES_KEY)? else {
            return Ok(Vec::new());
        };

        Ok(image_list_from_json(&json)?)
    }

    /// Overwrite the cached list with `images`
    pub fn store(&mut self, images: &[ImageEntry]) -> Result<(), CacheError> {
        let json = image_list_to_json(images)?;
        self.store.set(IMAGES_KEY, &json)?;
        debug!("💾 Cached {} images", images.len());
        Ok(())
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache").finish_non_exhaustive()
    }
}
