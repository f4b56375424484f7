/// Collage tiles
///
/// This module handles everything about a single photo in the grid:
/// - Fallback URL derivation and the per-tile load state machine
/// - Downloading and decoding a candidate URL
/// - Orientation classification and tile sizing
/// - Keeping positional tiles in step with the displayed list

pub mod fallback;
pub mod fetch;
pub mod layout;
pub mod slot;

pub use fallback::LoadState;
pub use fetch::LoadedImage;
pub use layout::{DisplayOptions, ImageMetadata};
pub use slot::{LoadOutcome, Tile, TileGrid};
