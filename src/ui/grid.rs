/// The photo grid
///
/// Tiles flow left to right in insertion order using `iced_aw::Wrap`.
/// Each tile's cell size comes from `tile::layout`.
use std::collections::HashMap;

use iced::alignment::Horizontal;
use iced::widget::{button, center, column, container, image, stack, text, tooltip};
use iced::{ContentFit, Element, Length};
use iced_aw::Wrap;

use crate::tile::layout::tile_layout;
use crate::tile::{DisplayOptions, ImageMetadata, LoadState, Tile};
use crate::Message;

pub fn grid<'a>(
    tiles: &'a [Tile],
    metadata: &'a HashMap<String, ImageMetadata>,
    options: &DisplayOptions,
) -> Element<'a, Message> {
    let elements = tiles
        .iter()
        .enumerate()
        .map(|(index, tile)| tile_view(index, tile, metadata, options))
        .collect();

    Wrap::with_elements(elements)
        .spacing(options.gap())
        .line_spacing(options.gap())
        .into()
}

fn tile_view<'a>(
    index: usize,
    tile: &'a Tile,
    metadata: &HashMap<String, ImageMetadata>,
    options: &DisplayOptions,
) -> Element<'a, Message> {
    let meta = metadata.get(tile.loader.original_url());
    let layout = tile_layout(meta, options);
    let width = layout.width_px(options);
    let height = layout.height_px(options);

    let body: Element<Message> = match (&tile.image, tile.loader.state()) {
        (Some(handle), _) => image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fill)
            .content_fit(ContentFit::Cover)
            .into(),
        (None, LoadState::Failed { .. }) => {
            let tried = tile.loader.candidates().len();
            center(
                column![
                    text("🖼️").size(32),
                    text("Image failed to load").size(12),
                    text(format!("{} link{} tried", tried, if tried == 1 { "" } else { "s" }))
                        .size(10),
                ]
                .spacing(6)
                .align_x(Horizontal::Center),
            )
            .style(container::dark)
            .into()
        }
        (None, _) if tile.loader.last_attempt_failed() => {
            center(text("Trying another link...").size(12)).into()
        }
        (None, _) => center(text("Loading...").size(12)).into(),
    };

    let caption = match (tile.loader.state(), meta) {
        (LoadState::Failed { .. }, _) => "Image failed to load".to_string(),
        (_, Some(meta)) => format!("Photo {} · {}×{}", index + 1, meta.width, meta.height),
        (_, None) => format!("Photo {}", index + 1),
    };

    let badge = container(
        container(text(format!("#{}", index + 1)).size(12))
            .padding([6, 10])
            .style(container::dark),
    )
    .width(Length::Fill)
    .align_x(Horizontal::Right)
    .padding(10);

    let cell = container(stack![body, badge])
        .width(Length::Fixed(width))
        .height(Length::Fixed(height))
        .style(container::rounded_box);

    tooltip(cell, text(caption).size(12), tooltip::Position::Bottom)
        .style(container::rounded_box)
        .into()
}

/// Shown when the collage has no photos yet
pub fn empty_state<'a>(fullscreen: bool) -> Element<'a, Message> {
    let hint = if fullscreen {
        "Photos will appear here as they are uploaded"
    } else {
        "Scan the QR code above with your phone to start uploading photos to the collage. \
         Photos will appear here in real-time!"
    };

    let mut content = column![
        text("📱").size(48),
        text("No photos yet!").size(24),
        text(hint).size(16),
    ]
    .spacing(10)
    .align_x(Horizontal::Center);

    if !fullscreen {
        content = content.push(
            button(text("🔄 Check for Photos").size(14))
                .on_press(Message::Refresh)
                .style(button::primary)
                .padding([12, 24]),
        );
    }

    container(content)
        .padding(if fullscreen { [40, 20] } else { [60, 20] })
        .width(Length::Fill)
        .align_x(Horizontal::Center)
        .style(container::rounded_box)
        .into()
}

/// Shown while the first image list is on its way
pub fn loading_screen(title: &str) -> Element<'_, Message> {
    center(
        column![
            text(format!("📸 {}", title)).size(32),
            text("Loading images...").size(18),
        ]
        .spacing(20)
        .align_x(Horizontal::Center),
    )
    .into()
}
