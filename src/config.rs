use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use url::Url;

use crate::state::cache::FileStore;
use crate::tile::DisplayOptions;

/// Live photo collage wall
#[derive(Debug, Parser)]
#[command(name = "live-collage", version, about = "Live-updating photo collage with a QR upload link")]
pub struct Cli {
    /// Base URL of the collage backend
    #[arg(long, env = "COLLAGE_BACKEND_URL", default_value = "http://localhost:5000")]
    pub backend: Url,

    /// Start in fullscreen display mode
    #[arg(long, env = "COLLAGE_FULLSCREEN")]
    pub fullscreen: bool,

    /// Only try each photo's original URL
    #[arg(long)]
    pub no_fallback: bool,

    /// Keep every tile the same size regardless of orientation
    #[arg(long)]
    pub uniform_layout: bool,

    /// Directory for the local image list cache
    #[arg(long, env = "COLLAGE_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Resolved application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: Url,
    pub display: DisplayOptions,
    pub cache_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Self {
        let cache_dir = cli.cache_dir.or_else(FileStore::default_dir);

        let config = Self {
            backend: cli.backend,
            display: DisplayOptions {
                fullscreen: cli.fullscreen,
                fallback_enabled: !cli.no_fallback,
                adaptive_layout: !cli.uniform_layout,
            },
            cache_dir,
        };

        info!("Backend: {}", config.backend);
        info!("Display: {:?}", config.display);
        config
    }

    /// Parse command line arguments and environment
    pub fn load() -> Self {
        Self::from_cli(Cli::parse())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["live-collage"]).unwrap();
        let config = AppConfig::from_cli(cli);

        assert_eq!(config.backend.as_str(), "http://localhost:5000/");
        assert!(config.display.fallback_enabled);
        assert!(config.display.adaptive_layout);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "live-collage",
            "--backend",
            "https://collage.example.com",
            "--fullscreen",
            "--no-fallback",
            "--uniform-layout",
            "--cache-dir",
            "/tmp/collage-cache",
        ])
        .unwrap();
        let config = AppConfig::from_cli(cli);

        assert_eq!(config.backend.host_str(), Some("collage.example.com"));
        assert!(config.display.fullscreen);
        assert!(!config.display.fallback_enabled);
        assert!(!config.display.adaptive_layout);
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/collage-cache")));
    }

    #[test]
    fn test_rejects_invalid_backend() {
        assert!(Cli::try_parse_from(["live-collage", "--backend", "not a url"]).is_err());
    }
}
