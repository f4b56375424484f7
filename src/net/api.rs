use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::FetchError;
use crate::state::data::{parse_image_list, CollageConfig, HealthStatus, ImageEntry};

/// Typed client for the collage backend's REST API
#[derive(Debug, Clone)]
pub struct BackendClient {
    base: Url,
    http: Client,
}

impl BackendClient {
    pub fn new(base: Url) -> Self {
        Self {
            base,
            http: Client::new(),
        }
    }

    /// Shared HTTP client, also used for image downloads
    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn images_url(&self) -> Url {
        self.endpoint("api/images")
    }

    pub fn config_url(&self) -> Url {
        self.endpoint("api/config")
    }

    pub fn health_url(&self) -> Url {
        self.endpoint("api/health")
    }

    /// Page a phone opens to upload photos; encoded in the QR code
    pub fn upload_url(&self) -> Url {
        self.endpoint("upload")
    }

    /// Socket.IO websocket endpoint for push notifications
    pub fn push_url(&self) -> Url {
        let mut url = self.endpoint("socket.io/");
        let scheme = if self.base.scheme() == "https" { "wss" } else { "ws" };
        // http(s) -> ws(s) is always an allowed scheme change
        let _ = url.set_scheme(scheme);
        url.set_query(Some("EIO=4&transport=websocket"));
        url
    }

    /// `GET /api/images`
    pub async fn fetch_images(&self) -> Result<Vec<ImageEntry>, FetchError> {
        let body = self.get_json(self.images_url()).await?;
        Ok(parse_image_list(body)?)
    }

    /// `GET /api/config`
    pub async fn fetch_config(&self) -> Result<CollageConfig, FetchError> {
        let body = self.get_json(self.config_url()).await?;
        Ok(CollageConfig::from_value(body)?)
    }

    /// `GET /api/health`
    pub async fn fetch_health(&self) -> Result<HealthStatus, FetchError> {
        let response = self.http.get(self.health_url()).send().await?;
        // An unhealthy backend still answers with a status object
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_json(&self, url: Url) -> Result<Value, FetchError> {
        debug!("GET {}", url);
        let response = self.http.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let joined = format!("{}/{}", self.base.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        url.set_query(None);
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use crate::error::PayloadError;
    use serde_json::json;

    async fn serve(app: Router) -> BackendClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        BackendClient::new(Url::parse(&format!("http://{}", addr)).unwrap())
    }

    #[test]
    fn test_derived_urls() {
        let client = BackendClient::new(Url::parse("http://localhost:5000").unwrap());
        assert_eq!(client.upload_url().as_str(), "http://localhost:5000/upload");
        assert_eq!(client.images_url().as_str(), "http://localhost:5000/api/images");
        assert_eq!(
            client.push_url().as_str(),
            "ws://localhost:5000/socket.io/?EIO=4&transport=websocket"
        );

        let nested = BackendClient::new(Url::parse("https://photos.example.com/party/").unwrap());
        assert_eq!(nested.config_url().as_str(), "https://photos.example.com/party/api/config");
        assert_eq!(
            nested.push_url().as_str(),
            "wss://photos.example.com/party/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[tokio::test]
    async fn test_fetch_images_and_config() {
        let app = Router::new()
            .route(
                "/api/images",
                get(|| async { Json(json!(["https://a.test/1.jpg", "https://a.test/2.jpg"])) }),
            )
            .route(
                "/api/config",
                get(|| async { Json(json!({"title": "Garden Party"})) }),
            );
        let client = serve(app).await;

        let images = client.fetch_images().await.unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[1].url(), "https://a.test/2.jpg");

        let config = client.fetch_config().await.unwrap();
        assert_eq!(config.title, "Garden Party");
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let app = Router::new().route(
            "/api/images",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let client = serve(app).await;

        assert_eq!(client.fetch_images().await, Err(FetchError::Status(500)));
        assert_eq!(client.fetch_config().await, Err(FetchError::Status(404)));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_typed() {
        let app = Router::new()
            .route("/api/images", get(|| async { Json(json!({"urls": []})) }))
            .route("/api/config", get(|| async { "not json" }));
        let client = serve(app).await;

        assert!(matches!(
            client.fetch_images().await,
            Err(FetchError::Payload(PayloadError::NotAList))
        ));
        assert!(matches!(
            client.fetch_config().await,
            Err(FetchError::Payload(PayloadError::Json(_)))
        ));
    }

    #[tokio::test]
    async fn test_fetch_health() {
        let app = Router::new().route(
            "/api/health",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"status": "error", "error": "no credentials"})),
                )
            }),
        );
        let client = serve(app).await;

        let health = client.fetch_health().await.unwrap();
        assert!(!health.is_healthy());
        assert_eq!(health.summary(), "Backend error");
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let client = BackendClient::new(Url::parse("http://127.0.0.1:9").unwrap());
        assert!(matches!(
            client.fetch_images().await,
            Err(FetchError::Transport(_))
        ));
    }
}
