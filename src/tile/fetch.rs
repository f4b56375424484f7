/// Download and decode a single candidate URL
///
/// A transport error, a non-success status or an undecodable body all
/// count as a load failure and move the tile's fallback chain forward.
use iced::widget::image::Handle;
use image::imageops::FilterType;
use tracing::debug;

use crate::error::LoadError;

/// Longest edge of the decoded bitmap kept for display
const DISPLAY_MAX: u32 = 800;

/// A decoded image ready for the grid
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub handle: Handle,
    /// Natural width before any display downscale
    pub width: u32,
    /// Natural height before any display downscale
    pub height: u32,
}

/// Fetch `url` and decode it off the UI thread
pub async fn fetch_image(client: reqwest::Client, url: String) -> Result<LoadedImage, LoadError> {
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| LoadError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status(status.as_u16()));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| LoadError::Transport(e.to_string()))?;

    debug!("⬇️  Downloaded {}KB from {}", bytes.len() / 1024, url);

    // Spawn blocking because decoding is CPU-intensive
    tokio::task::spawn_blocking(move || decode_image(&bytes))
        .await
        .map_err(|e| LoadError::Decode(format!("Task join error: {}", e)))?
}

/// Decode image bytes, keeping natural dimensions and a display-sized bitmap
pub fn decode_image(bytes: &[u8]) -> Result<LoadedImage, LoadError> {
    let img = image::load_from_memory(bytes).map_err(|e| LoadError::Decode(e.to_string()))?;
    let (width, height) = (img.width(), img.height());

    let display = if width > DISPLAY_MAX || height > DISPLAY_MAX {
        img.resize(DISPLAY_MAX, DISPLAY_MAX, FilterType::Triangle)
    } else {
        img
    };

    let rgba = display.to_rgba8();
    let handle = Handle::from_rgba(rgba.width(), rgba.height(), rgba.into_raw());

    Ok(LoadedImage {
        handle,
        width,
        height,
    })
}
