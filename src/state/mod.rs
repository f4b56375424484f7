/// State management module
///
/// This module handles all collage state, including:
/// - Typed records for images, config and backend health (data.rs)
/// - The local key/value cache of the displayed list (cache.rs)
/// - The controller that merges loads and pushes (controller.rs)

pub mod cache;
pub mod controller;
pub mod data;
