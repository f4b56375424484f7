/// Shared data structures for the collage state
///
/// These records are the typed form of everything that crosses the
/// boundary: REST responses, push payloads and the local cache. Raw JSON
/// is validated here and nowhere else.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::PayloadError;

/// Title shown until the backend config arrives
pub const DEFAULT_TITLE: &str = "Live Photo Collage";

/// A single photo in the collage, identified only by its URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ImageEntry(String);

impl ImageEntry {
    /// Validate a raw string as an http(s) image URL
    pub fn parse(raw: &str) -> Option<Self> {
        let url = Url::parse(raw).ok()?;
        match url.scheme() {
            "http" | "https" => Some(Self(raw.to_string())),
            _ => None,
        }
    }

    pub fn url(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate a JSON value as an ordered list of image URLs.
///
/// Used for `/api/images`, `new_images` push payloads and the cache.
pub fn parse_image_list(value: Value) -> Result<Vec<ImageEntry>, PayloadError> {
    let Value::Array(items) = value else {
        return Err(PayloadError::NotAList);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::String(raw) => ImageEntry::parse(&raw)
                .ok_or(PayloadError::InvalidUrl { index, url: raw }),
            other => Err(PayloadError::InvalidUrl {
                index,
                url: other.to_string(),
            }),
        })
        .collect()
}

/// Parse an image list from JSON text
pub fn image_list_from_json(json: &str) -> Result<Vec<ImageEntry>, PayloadError> {
    parse_image_list(serde_json::from_str(json)?)
}

/// Encode an image list as a JSON array of strings
pub fn image_list_to_json(images: &[ImageEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string(images)
}

/// Display configuration served by `/api/config`
#[derive(Debug, Clone, PartialEq)]
pub struct CollageConfig {
    /// Heading shown above the collage
    pub title: String,
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl CollageConfig {
    /// Parse and validate a config object; unknown fields are ignored
    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        #[derive(Deserialize)]
        struct Raw {
            title: Option<String>,
        }

        let raw: Raw = serde_json::from_value(value)?;
        match raw.title {
            Some(title) if !title.trim().is_empty() => Ok(Self { title }),
            _ => Err(PayloadError::MissingTitle),
        }
    }
}

/// Backend status served by `/api/health`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub images_count: Option<u64>,
    #[serde(default)]
    pub upload_folder: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }

    /// One-line summary for the stats bar
    pub fn summary(&self) -> String {
        let mut summary = match (self.is_healthy(), self.images_count) {
            (true, Some(count)) => format!("Backend healthy ({} on server)", count),
            (true, None) => "Backend healthy".to_string(),
            (false, _) => format!("Backend {}", self.status),
        };
        if let Some(folder) = &self.upload_folder {
            summary.push_str(&format!(", uploads to {}", folder));
        }
        summary
    }
}
