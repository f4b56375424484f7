use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Local};
use iced::widget::{column, container, qr_code, scrollable, Column};
use iced::{window, Alignment, Element, Length, Subscription, Task, Theme};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

mod config;
mod error;
mod net;
mod state;
mod tile;
mod ui;

use config::AppConfig;
use error::{FetchError, LoadError};
use net::{push, BackendClient, PushEvent};
use state::cache::ImageCache;
use state::controller::CollageController;
use state::data::{CollageConfig, HealthStatus, ImageEntry};
use tile::fetch::fetch_image;
use tile::{DisplayOptions, ImageMetadata, LoadOutcome, LoadedImage, TileGrid};

/// Main application state
struct Collage {
    /// REST client for the collage backend
    client: BackendClient,
    /// Displayed image list, cache and connectivity
    controller: CollageController,
    /// Title and other display settings from the backend
    config: CollageConfig,
    display: DisplayOptions,
    /// One tile per displayed image, by position
    tiles: TileGrid,
    /// Natural dimensions of displayed images, by original URL
    metadata: HashMap<String, ImageMetadata>,
    upload_url: String,
    qr: Option<qr_code::Data>,
    health: Option<HealthStatus>,
    /// When the list last changed
    last_update: Option<DateTime<Local>>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// `/api/images` answered (initial load or refresh)
    ImagesLoaded(Result<Vec<ImageEntry>, FetchError>),
    /// `/api/config` answered
    ConfigLoaded(Result<CollageConfig, FetchError>),
    /// `/api/health` answered
    HealthChecked(Result<HealthStatus, FetchError>),
    /// Something arrived on the push channel
    Push(PushEvent),
    /// User asked to reload the image list
    Refresh,
    /// User closed the error banner
    DismissError,
    /// User switched between windowed and fullscreen display
    ToggleFullscreen,
    /// One candidate URL of a tile finished loading
    TileLoaded {
        index: usize,
        generation: u64,
        url: String,
        result: Result<LoadedImage, LoadError>,
    },
}

impl Collage {
    /// Create the application and issue the startup requests
    fn new(config: AppConfig) -> (Self, Task<Message>) {
        let client = BackendClient::new(config.backend);
        let controller = CollageController::new(ImageCache::open_or_memory(config.cache_dir));

        let upload_url = client.upload_url().to_string();
        let qr = qr_code::Data::with_error_correction(&upload_url, qr_code::ErrorCorrection::Medium)
            .map_err(|e| warn!("⚠️  Could not encode upload QR code: {:?}", e))
            .ok();

        info!("🎨 Live collage starting, uploads at {}", upload_url);

        let startup = Task::batch([
            Self::load_images(&client),
            Task::perform(
                {
                    let client = client.clone();
                    async move { client.fetch_config().await }
                },
                Message::ConfigLoaded,
            ),
            Task::perform(
                {
                    let client = client.clone();
                    async move { client.fetch_health().await }
                },
                Message::HealthChecked,
            ),
            Self::window_mode(config.display.fullscreen),
        ]);

        (
            Collage {
                client,
                controller,
                config: CollageConfig::default(),
                display: config.display,
                tiles: TileGrid::default(),
                metadata: HashMap::new(),
                upload_url,
                qr,
                health: None,
                last_update: None,
            },
            startup,
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ImagesLoaded(result) => {
                let succeeded = result.is_ok();
                // Cache write failures are logged by the controller
                let _ = self.controller.apply_initial(result);
                if succeeded {
                    self.last_update = Some(Local::now());
                }
                self.refresh_tiles()
            }
            Message::ConfigLoaded(Ok(config)) => {
                info!("Config loaded: {:?}", config.title);
                self.config = config;
                Task::none()
            }
            Message::ConfigLoaded(Err(e)) => {
                warn!("⚠️  Config fetch failed, keeping {:?}: {}", self.config.title, e);
                Task::none()
            }
            Message::HealthChecked(Ok(health)) => {
                info!("Backend health: {}", health.summary());
                self.health = Some(health);
                Task::none()
            }
            Message::HealthChecked(Err(e)) => {
                warn!("⚠️  Health check failed: {}", e);
                Task::none()
            }
            Message::Push(event) => self.handle_push(event),
            Message::Refresh => {
                if self.controller.begin_refresh() {
                    info!("🔄 Refreshing images");
                    Self::load_images(&self.client)
                } else {
                    Task::none()
                }
            }
            Message::DismissError => {
                self.controller.dismiss_error();
                Task::none()
            }
            Message::ToggleFullscreen => {
                self.display.fullscreen = !self.display.fullscreen;
                Self::window_mode(self.display.fullscreen)
            }
            Message::TileLoaded {
                index,
                generation,
                url,
                result,
            } => self.tile_loaded(index, generation, url, result),
        }
    }

    fn handle_push(&mut self, event: PushEvent) -> Task<Message> {
        match event {
            PushEvent::Connected => {
                info!("🟢 Push channel connected");
                self.controller.set_connected(true);
                Task::none()
            }
            PushEvent::Disconnected => {
                self.controller.set_connected(false);
                Task::none()
            }
            PushEvent::ConnectError(reason) => {
                error!("Push channel connection error: {}", reason);
                self.controller.connection_failed();
                Task::none()
            }
            PushEvent::NewImages(batch) => {
                if batch.is_empty() {
                    return Task::none();
                }
                let _ = self.controller.append_batch(batch);
                self.last_update = Some(Local::now());
                self.refresh_tiles()
            }
        }
    }

    /// Bring tiles in line with the displayed list and start fresh ones
    fn refresh_tiles(&mut self) -> Task<Message> {
        let images = self.controller.images();
        let fresh = self.tiles.sync(images, self.display.fallback_enabled);

        let shown: HashSet<&str> = images.iter().map(|entry| entry.url()).collect();
        self.metadata.retain(|url, _| shown.contains(url.as_str()));

        Task::batch(
            fresh
                .into_iter()
                .map(|(index, generation, url)| self.fetch_tile(index, generation, url)),
        )
    }

    fn tile_loaded(
        &mut self,
        index: usize,
        generation: u64,
        url: String,
        result: Result<LoadedImage, LoadError>,
    ) -> Task<Message> {
        if let Err(e) = &result {
            warn!("⚠️  Image #{} failed: {}", index + 1, e);
        }

        match self.tiles.finish(index, generation, &url, result) {
            LoadOutcome::Loaded(Some(meta)) => {
                if let Some(tile) = self.tiles.tiles().get(index) {
                    self.metadata
                        .insert(tile.loader.original_url().to_string(), meta);
                }
                Task::none()
            }
            LoadOutcome::Retry(next) => self.fetch_tile(index, generation, next),
            LoadOutcome::Loaded(None) | LoadOutcome::Exhausted | LoadOutcome::Stale => Task::none(),
        }
    }

    fn fetch_tile(&self, index: usize, generation: u64, url: String) -> Task<Message> {
        let http = self.client.http().clone();
        Task::perform(fetch_image(http, url.clone()), move |result| Message::TileLoaded {
            index,
            generation,
            url: url.clone(),
            result,
        })
    }

    fn load_images(client: &BackendClient) -> Task<Message> {
        let client = client.clone();
        Task::perform(
            async move { client.fetch_images().await },
            Message::ImagesLoaded,
        )
    }

    fn window_mode(fullscreen: bool) -> Task<Message> {
        let mode = if fullscreen {
            window::Mode::Fullscreen
        } else {
            window::Mode::Windowed
        };
        window::get_latest().and_then(move |id| window::change_mode(id, mode))
    }

    /// The push channel lives exactly as long as the collage is shown
    fn subscription(&self) -> Subscription<Message> {
        push::subscription(self.client.push_url()).map(Message::Push)
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        if self.controller.is_loading() && self.controller.images().is_empty() {
            return ui::grid::loading_screen(&self.config.title);
        }

        let fullscreen = self.display.fullscreen;
        let mut content: Column<Message> = column![ui::header::title(&self.config.title, fullscreen)]
            .spacing(20)
            .padding(if fullscreen { 10 } else { 20 })
            .align_x(Alignment::Center);

        if !fullscreen {
            content = content.push(ui::header::connection_badge(self.controller.is_connected()));
            if let Some(error) = self.controller.error() {
                content = content.push(ui::header::error_banner(error, self.controller.is_loading()));
            }
            content = content
                .push(ui::header::qr_card(self.qr.as_ref(), &self.upload_url))
                .push(ui::header::stats_bar(
                    self.controller.images().len(),
                    self.controller.is_loading(),
                    self.last_update.as_ref(),
                    self.health.as_ref(),
                ));
        }

        content = if self.tiles.is_empty() {
            content.push(ui::grid::empty_state(fullscreen))
        } else {
            content.push(ui::grid::grid(self.tiles.tiles(), &self.metadata, &self.display))
        };

        let page = container(content).width(Length::Fill).center_x(Length::Fill);
        let page = if fullscreen {
            page
        } else {
            page.max_width(1200.0)
        };

        scrollable(container(page).center_x(Length::Fill)).into()
    }

    fn title(&self) -> String {
        self.config.title.clone()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }
}

fn main() -> iced::Result {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("live_collage=info"));
    fmt().with_env_filter(filter).init();

    let config = AppConfig::load();

    iced::application(Collage::title, Collage::update, Collage::view)
        .subscription(Collage::subscription)
        .theme(Collage::theme)
        .centered()
        .run_with(move || Collage::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::widget::image::Handle;
    use tile::LoadState;
    use url::Url;

    const DRIVE_URL: &str = "https://drive.google.com/uc?export=view&id=f1";

    fn collage() -> Collage {
        let config = AppConfig {
            backend: Url::parse("http://127.0.0.1:9").unwrap(),
            display: DisplayOptions::default(),
            cache_dir: None,
        };
        let (collage, _startup) = Collage::new(config);
        collage
    }

    fn entries(urls: &[&str]) -> Vec<ImageEntry> {
        urls.iter().map(|u| ImageEntry::parse(u).unwrap()).collect()
    }

    fn image(width: u32, height: u32) -> Result<LoadedImage, LoadError> {
        Ok(LoadedImage {
            handle: Handle::from_rgba(1, 1, vec![0, 0, 0, 255]),
            width,
            height,
        })
    }

    fn tile_loaded(
        collage: &mut Collage,
        index: usize,
        url: &str,
        result: Result<LoadedImage, LoadError>,
    ) {
        let generation = collage.tiles.tiles()[index].generation();
        let _ = collage.update(Message::TileLoaded {
            index,
            generation,
            url: url.to_string(),
            result,
        });
    }

    #[test]
    fn test_tile_results_drive_the_fallback_chain() {
        let mut collage = collage();
        let _ = collage.update(Message::ImagesLoaded(Ok(entries(&[DRIVE_URL]))));
        assert_eq!(
            collage.tiles.tiles()[0].loader.state(),
            LoadState::Loading { attempt: 0 }
        );

        tile_loaded(&mut collage, 0, DRIVE_URL, Err(LoadError::Status(403)));
        let next = collage.tiles.tiles()[0].loader.current_url().to_string();
        assert_eq!(next, "https://drive.google.com/thumbnail?id=f1&sz=w400-h400");

        // A repeated result for the failed candidate is ignored
        tile_loaded(&mut collage, 0, DRIVE_URL, Err(LoadError::Status(403)));
        assert_eq!(
            collage.tiles.tiles()[0].loader.state(),
            LoadState::Loading { attempt: 1 }
        );

        tile_loaded(&mut collage, 0, &next, image(1000, 1600));
        assert_eq!(
            collage.tiles.tiles()[0].loader.state(),
            LoadState::Loaded { attempt: 1 }
        );
        assert_eq!(collage.metadata[DRIVE_URL].height, 1600);
    }

    #[test]
    fn test_refresh_drops_metadata_of_removed_images() {
        let mut collage = collage();
        let a = "https://img.test/a.jpg";
        let b = "https://img.test/b.jpg";
        let _ = collage.update(Message::ImagesLoaded(Ok(entries(&[a, b]))));
        tile_loaded(&mut collage, 0, a, image(1600, 1000));
        tile_loaded(&mut collage, 1, b, image(1000, 1600));
        assert_eq!(collage.metadata.len(), 2);

        let _ = collage.update(Message::Refresh);
        let _ = collage.update(Message::ImagesLoaded(Ok(entries(&[a]))));

        assert_eq!(collage.metadata.len(), 1);
        assert!(collage.metadata.contains_key(a));
    }

    #[test]
    fn test_push_appends_tiles() {
        let mut collage = collage();
        let _ = collage.update(Message::ImagesLoaded(Ok(entries(&["https://img.test/a.jpg"]))));
        let _ = collage.update(Message::Push(PushEvent::NewImages(entries(&[
            "https://img.test/b.jpg",
        ]))));

        assert_eq!(collage.tiles.tiles().len(), 2);
        assert_eq!(collage.controller.images().len(), 2);
    }
}
