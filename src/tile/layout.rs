/// Aspect-ratio based tile sizing
///
/// Natural image dimensions are only known after a tile loads. Until then
/// every tile is a uniform 1x1 cell.

/// Ratio above which an image is treated as landscape
const LANDSCAPE_RATIO: f32 = 1.2;
/// Ratio below which an image is treated as portrait
const PORTRAIT_RATIO: f32 = 0.8;

/// Fullscreen: landscape wider than this spans two columns
const WIDE_RATIO: f32 = 1.5;
/// Fullscreen: portrait narrower than this spans two rows
const TALL_RATIO: f32 = 0.6;

const DEFAULT_HEIGHT: f32 = 250.0;
const LANDSCAPE_HEIGHT: f32 = 200.0;
const PORTRAIT_HEIGHT: f32 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

impl Orientation {
    /// Classify a width/height ratio
    pub fn classify(aspect_ratio: f32) -> Self {
        if aspect_ratio > LANDSCAPE_RATIO {
            Orientation::Landscape
        } else if aspect_ratio < PORTRAIT_RATIO {
            Orientation::Portrait
        } else {
            Orientation::Square
        }
    }
}

/// Layout facts about a loaded image, keyed by its original URL
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f32,
    pub orientation: Orientation,
}

impl ImageMetadata {
    /// `None` if either dimension is zero
    pub fn from_dimensions(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        let aspect_ratio = width as f32 / height as f32;
        Some(Self {
            width,
            height,
            aspect_ratio,
            orientation: Orientation::classify(aspect_ratio),
        })
    }
}

/// How the grid should display the collage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    pub fullscreen: bool,
    /// Walk alternative URLs when a tile fails to load
    pub fallback_enabled: bool,
    /// Size tiles by orientation once their dimensions are known
    pub adaptive_layout: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            fullscreen: false,
            fallback_enabled: true,
            adaptive_layout: true,
        }
    }
}

impl DisplayOptions {
    /// Width of a single grid column
    pub fn column_width(&self) -> f32 {
        if self.fullscreen {
            300.0
        } else {
            250.0
        }
    }

    pub fn gap(&self) -> f32 {
        if self.fullscreen {
            15.0
        } else {
            20.0
        }
    }
}

/// Cell size of one tile in the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileLayout {
    pub column_span: u16,
    pub row_span: u16,
    /// Height of one row of this tile, in logical pixels
    pub height: f32,
}

impl TileLayout {
    const UNIFORM: TileLayout = TileLayout {
        column_span: 1,
        row_span: 1,
        height: DEFAULT_HEIGHT,
    };

    /// Total pixel width including the gaps the tile spans over
    pub fn width_px(&self, options: &DisplayOptions) -> f32 {
        let span = self.column_span as f32;
        span * options.column_width() + (span - 1.0) * options.gap()
    }

    /// Total pixel height including the gaps the tile spans over
    pub fn height_px(&self, options: &DisplayOptions) -> f32 {
        let span = self.row_span as f32;
        span * self.height + (span - 1.0) * options.gap()
    }
}

/// Grid cell for a tile. Windowed mode keeps every tile uniform.
pub fn tile_layout(metadata: Option<&ImageMetadata>, options: &DisplayOptions) -> TileLayout {
    let Some(metadata) = metadata else {
        return TileLayout::UNIFORM;
    };
    if !options.adaptive_layout || !options.fullscreen {
        return TileLayout::UNIFORM;
    }

    match metadata.orientation {
        Orientation::Landscape => TileLayout {
            column_span: if metadata.aspect_ratio > WIDE_RATIO { 2 } else { 1 },
            row_span: 1,
            height: LANDSCAPE_HEIGHT,
        },
        Orientation::Portrait => TileLayout {
            column_span: 1,
            row_span: if metadata.aspect_ratio < TALL_RATIO { 2 } else { 1 },
            height: PORTRAIT_HEIGHT,
        },
        Orientation::Square => TileLayout::UNIFORM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fullscreen() -> DisplayOptions {
        DisplayOptions {
            fullscreen: true,
            ..DisplayOptions::default()
        }
    }

    #[test]
    fn test_orientation_classification() {
        let landscape = ImageMetadata::from_dimensions(1600, 1000).unwrap();
        assert_eq!(landscape.orientation, Orientation::Landscape);
        assert!((landscape.aspect_ratio - 1.6).abs() < f32::EPSILON);

        let portrait = ImageMetadata::from_dimensions(1000, 1600).unwrap();
        assert_eq!(portrait.orientation, Orientation::Portrait);

        let square = ImageMetadata::from_dimensions(1000, 1000).unwrap();
        assert_eq!(square.orientation, Orientation::Square);
    }

    #[test]
    fn test_classification_thresholds_are_exclusive() {
        assert_eq!(Orientation::classify(1.2), Orientation::Square);
        assert_eq!(Orientation::classify(0.8), Orientation::Square);
        assert_eq!(Orientation::classify(1.21), Orientation::Landscape);
        assert_eq!(Orientation::classify(0.79), Orientation::Portrait);
    }

    #[test]
    fn test_zero_dimension_has_no_metadata() {
        assert!(ImageMetadata::from_dimensions(0, 100).is_none());
        assert!(ImageMetadata::from_dimensions(100, 0).is_none());
    }

    #[test]
    fn test_windowed_layout_is_uniform() {
        let wide = ImageMetadata::from_dimensions(2000, 1000).unwrap();
        let options = DisplayOptions::default();
        assert_eq!(tile_layout(Some(&wide), &options), TileLayout::UNIFORM);
        assert_eq!(tile_layout(None, &fullscreen()), TileLayout::UNIFORM);
    }

    #[test]
    fn test_fullscreen_spans() {
        let options = fullscreen();

        let wide = ImageMetadata::from_dimensions(1600, 1000).unwrap();
        let layout = tile_layout(Some(&wide), &options);
        assert_eq!((layout.column_span, layout.row_span), (2, 1));
        assert_eq!(layout.height, 200.0);
        assert_eq!(layout.width_px(&options), 615.0);

        let mild = ImageMetadata::from_dimensions(1300, 1000).unwrap();
        assert_eq!(tile_layout(Some(&mild), &options).column_span, 1);

        let tall = ImageMetadata::from_dimensions(500, 1000).unwrap();
        let layout = tile_layout(Some(&tall), &options);
        assert_eq!((layout.column_span, layout.row_span), (1, 2));
        assert_eq!(layout.height_px(&options), 615.0);

        let square = ImageMetadata::from_dimensions(900, 1000).unwrap();
        assert_eq!(tile_layout(Some(&square), &options), TileLayout::UNIFORM);
    }

    #[test]
    fn test_uniform_layout_option_disables_spans() {
        let options = DisplayOptions {
            adaptive_layout: false,
            ..fullscreen()
        };
        let wide = ImageMetadata::from_dimensions(1600, 1000).unwrap();
        assert_eq!(tile_layout(Some(&wide), &options), TileLayout::UNIFORM);
    }
}
