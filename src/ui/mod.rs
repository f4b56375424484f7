/// User interface components
///
/// - `header.rs` - title, connection badge, error banner, QR card, stats bar
/// - `grid.rs` - photo grid, empty state and loading screen

pub mod grid;
pub mod header;
