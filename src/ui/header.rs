/// Header widgets: title, connection badge, error banner, QR card, stats bar
use chrono::{DateTime, Local};
use iced::widget::{button, column, container, qr_code, row, text, Space};
use iced::{Alignment, Element, Length};

use crate::state::data::HealthStatus;
use crate::Message;

pub fn title(title: &str, fullscreen: bool) -> Element<'_, Message> {
    let heading = if fullscreen {
        text(title).size(40)
    } else {
        text(format!("📸 {}", title)).size(32)
    };

    let exit: Element<Message> = if fullscreen {
        button("Exit Fullscreen")
            .on_press(Message::ToggleFullscreen)
            .style(button::primary)
            .padding([8, 16])
            .into()
    } else {
        Space::with_width(Length::Shrink).into()
    };

    row![Space::with_width(Length::Fill), heading, Space::with_width(Length::Fill), exit]
        .align_y(Alignment::Center)
        .into()
}

pub fn connection_badge<'a>(connected: bool) -> Element<'a, Message> {
    let label = if connected {
        text("🟢 Connected").size(12).style(text::success)
    } else {
        text("🔴 Disconnected").size(12).style(text::danger)
    };

    container(label)
        .padding([5, 10])
        .style(container::rounded_box)
        .into()
}

/// Dismissible banner with a manual retry action
pub fn error_banner(error: &str, loading: bool) -> Element<'_, Message> {
    let retry = button(text("🔄 Retry").size(12))
        .on_press_maybe((!loading).then_some(Message::Refresh))
        .style(button::secondary)
        .padding([5, 10]);

    let dismiss = button(text("✕").size(12))
        .on_press(Message::DismissError)
        .style(button::text)
        .padding([5, 10]);

    container(
        row![text(format!("⚠️ {}", error)).style(text::danger), retry, dismiss]
            .spacing(10)
            .align_y(Alignment::Center),
    )
    .padding(10)
    .style(container::bordered_box)
    .into()
}

/// QR code pointing phones at the upload page
pub fn qr_card<'a>(data: Option<&'a qr_code::Data>, upload_url: &'a str) -> Element<'a, Message> {
    let code: Element<Message> = match data {
        Some(data) => qr_code(data).cell_size(4).into(),
        None => text(upload_url).size(14).into(),
    };

    let blurb = column![
        text("📱 Scan to Upload Photos").size(16).style(text::primary),
        text("Use your phone camera to scan this QR code and start uploading photos to the collage")
            .size(14),
    ]
    .spacing(8)
    .max_width(260.0);

    container(row![code, blurb].spacing(25).align_y(Alignment::Center))
        .padding(20)
        .style(container::rounded_box)
        .into()
}

pub fn stats_bar<'a>(
    count: usize,
    loading: bool,
    last_update: Option<&DateTime<Local>>,
    health: Option<&HealthStatus>,
) -> Element<'a, Message> {
    let photos = text(format!(
        "{} photo{} in collage",
        count,
        if count == 1 { "" } else { "s" }
    ))
    .size(16);

    let mut details = Vec::new();
    if let Some(at) = last_update {
        details.push(format!("Last update {}", at.format("%H:%M:%S")));
    }
    if let Some(health) = health {
        details.push(health.summary());
    }
    let details = text(details.join(" · ")).size(12);

    let refresh = button(text(if loading { "⏳ Loading..." } else { "🔄 Refresh" }).size(14))
        .on_press_maybe((!loading).then_some(Message::Refresh))
        .style(button::success)
        .padding([8, 16]);

    let fullscreen = button(text("📺 Fullscreen").size(14))
        .on_press(Message::ToggleFullscreen)
        .style(button::primary)
        .padding([8, 16]);

    container(
        row![
            column![photos, details].spacing(4),
            Space::with_width(Length::Fill),
            refresh,
            fullscreen
        ]
        .spacing(10)
        .align_y(Alignment::Center),
    )
    .padding([15, 20])
    .width(Length::Fill)
    .style(container::rounded_box)
    .into()
}
