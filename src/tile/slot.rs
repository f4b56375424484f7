use iced::widget::image::Handle;
use tracing::error;

use super::fallback::FallbackLoader;
use super::fetch::LoadedImage;
use super::layout::ImageMetadata;
use crate::error::LoadError;
use crate::state::data::ImageEntry;

/// One rendered position in the grid
#[derive(Debug, Clone)]
pub struct Tile {
    pub loader: FallbackLoader,
    /// Decoded bitmap once a candidate loaded
    pub image: Option<Handle>,
    /// Distinguishes this tile from earlier tiles at the same position
    generation: u64,
}

impl Tile {
    fn new(entry: &ImageEntry, fallback_enabled: bool, generation: u64) -> Self {
        Self {
            loader: FallbackLoader::new(entry.url(), fallback_enabled),
            image: None,
            generation,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What a finished candidate fetch means for its tile
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The tile shows the image; dimensions if they are usable for layout
    Loaded(Option<ImageMetadata>),
    /// Fetch this candidate next
    Retry(String),
    /// Every candidate failed
    Exhausted,
    /// The result belongs to a tile that no longer exists or moved on
    Stale,
}

/// The grid's tiles, one per displayed image, by position
#[derive(Debug, Default)]
pub struct TileGrid {
    tiles: Vec<Tile>,
    next_generation: u64,
}

impl TileGrid {
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Reconcile tiles with the displayed list.
    ///
    /// Tiles are positional: a tile whose index still shows the same URL
    /// keeps its load state, any other position gets a fresh tile. Returns
    /// the first URL to fetch for every fresh tile.
    pub fn sync(&mut self, images: &[ImageEntry], fallback_enabled: bool) -> Vec<(usize, u64, String)> {
        self.tiles.truncate(images.len());

        let mut fresh = Vec::new();
        for (index, entry) in images.iter().enumerate() {
            if let Some(tile) = self.tiles.get(index) {
                if tile.loader.original_url() == entry.url() {
                    continue;
                }
            }

            let generation = self.next_generation;
            self.next_generation += 1;
            let mut tile = Tile::new(entry, fallback_enabled, generation);
            if let Some(url) = tile.loader.start() {
                fresh.push((index, generation, url.to_string()));
            }

            if index < self.tiles.len() {
                self.tiles[index] = tile;
            } else {
                self.tiles.push(tile);
            }
        }
        fresh
    }

    /// Apply the result of fetching `url` for the tile at `index`
    pub fn finish(
        &mut self,
        index: usize,
        generation: u64,
        url: &str,
        result: Result<LoadedImage, LoadError>,
    ) -> LoadOutcome {
        let Some(tile) = self.tiles.get_mut(index) else {
            return LoadOutcome::Stale;
        };
        if tile.generation != generation
            || tile.loader.is_terminal()
            || tile.loader.current_url() != url
        {
            return LoadOutcome::Stale;
        }

        match result {
            Ok(loaded) => {
                tile.loader.succeed();
                tile.image = Some(loaded.handle);
                LoadOutcome::Loaded(ImageMetadata::from_dimensions(loaded.width, loaded.height))
            }
            Err(_) => match tile.loader.fail() {
                Some(next) => LoadOutcome::Retry(next.to_string()),
                None => {
                    error!("All URL formats failed for image {}", index + 1);
                    LoadOutcome::Exhausted
                }
            },
        }
    }
}
