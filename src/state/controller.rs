/// The collage state controller
///
/// Owns the displayed image list and keeps it equal to the local cache
/// after every mutation. Network calls happen elsewhere; the controller
/// only applies their results, synchronously, inside one `update` call.
use tracing::{info, warn};

use super::cache::ImageCache;
use super::data::ImageEntry;
use crate::error::{CacheError, FetchError};

/// Banner text when the push channel cannot connect
pub const CONNECTION_FAILED: &str = "Connection to server failed";

#[derive(Debug)]
pub struct CollageController {
    images: Vec<ImageEntry>,
    cache: ImageCache,
    /// True while an initial load or refresh is in flight
    loading: bool,
    connected: bool,
    error: Option<String>,
}

impl CollageController {
    /// A controller starts "loading": the initial fetch is issued at startup
    pub fn new(cache: ImageCache) -> Self {
        Self {
            images: Vec::new(),
            cache,
            loading: true,
            connected: false,
            error: None,
        }
    }

    pub fn images(&self) -> &[ImageEntry] {
        &self.images
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Mark a user-triggered refresh as started.
    ///
    /// Returns false if a load is already in flight, in which case the
    /// caller must not issue another fetch.
    pub fn begin_refresh(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    /// Apply the result of `GET /api/images` (initial load or refresh)
    pub fn apply_initial(
        &mut self,
        result: Result<Vec<ImageEntry>, FetchError>,
    ) -> Result<(), CacheError> {
        self.loading = false;

        match result {
            Ok(images) => {
                info!("📸 Loaded {} images from backend", images.len());
                self.error = None;
                self.replace(images)
            }
            Err(err) => {
                warn!("⚠️  Fetching images failed: {}", err);
                self.error = Some(err.to_string());
                self.fall_back_to_cache();
                Ok(())
            }
        }
    }

    /// Append a pushed batch in delivery order. Empty batches are ignored.
    pub fn append_batch(&mut self, batch: Vec<ImageEntry>) -> Result<(), CacheError> {
        if batch.is_empty() {
            return Ok(());
        }

        info!("🆕 Received {} new images", batch.len());
        self.images.extend(batch);
        self.write_through()
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
        if connected {
            self.error = None;
        }
    }

    pub fn connection_failed(&mut self) {
        self.connected = false;
        self.error = Some(CONNECTION_FAILED.to_string());
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    fn replace(&mut self, images: Vec<ImageEntry>) -> Result<(), CacheError> {
        self.images = images;
        self.write_through()
    }

    fn write_through(&mut self) -> Result<(), CacheError> {
        self.cache.store(&self.images).map_err(|e| {
            warn!("⚠️  Failed to write image cache: {}", e);
            e
        })
    }

    fn fall_back_to_cache(&mut self) {
        match self.cache.load() {
            Ok(cached) if !cached.is_empty() => {
                info!("💾 Using {} cached images", cached.len());
                self.images = cached;
            }
            Ok(_) => {}
            Err(e) => warn!("⚠️  Ignoring unreadable image cache: {}", e),
        }
    }
}
