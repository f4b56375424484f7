/// Push channel for newly uploaded photos
///
/// The channel is an owned resource: `subscription` opens it when the view
/// starts listening and the socket is dropped with the subscription. There
/// is no shared, process-wide connection.
use std::time::Duration;

use iced::futures::{SinkExt, Stream, StreamExt};
use iced::Subscription;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

use super::frame::{self, Frame};
use crate::error::PushError;
use crate::state::data::{parse_image_list, ImageEntry};

/// Event name carrying a batch of new image URLs
pub const NEW_IMAGES_EVENT: &str = "new_images";

/// Pause before reconnecting after the channel drops
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What the push channel reports to the collage
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    Connected,
    Disconnected,
    ConnectError(String),
    NewImages(Vec<ImageEntry>),
}

/// One live Socket.IO connection to the backend
pub struct PushChannel {
    socket: WsStream,
}

impl PushChannel {
    /// Open the websocket, complete the Engine.IO handshake and join the
    /// default namespace
    pub async fn connect(url: &Url) -> Result<Self, PushError> {
        debug!("Connecting push channel to {}", url);
        let (mut socket, _response) = connect_async(url.as_str()).await?;

        let handshake = loop {
            let Some(message) = socket.next().await else {
                return Err(PushError::Handshake("closed before open packet".into()));
            };
            if let Message::Text(text) = message? {
                match frame::decode(&text)? {
                    Frame::Open(handshake) => break handshake,
                    other => {
                        return Err(PushError::Handshake(format!("unexpected {:?}", other)));
                    }
                }
            }
        };
        debug!(
            "Engine.IO session {} (ping every {}ms, timeout {}ms)",
            handshake.sid, handshake.ping_interval, handshake.ping_timeout
        );

        socket.send(Message::Text(frame::CONNECT.into())).await?;
        Ok(Self { socket })
    }

    /// Wait for the next event worth reporting.
    ///
    /// Pings are answered here. Returns `Ok(None)` once the server closes
    /// the session.
    pub async fn next_event(&mut self) -> Result<Option<PushEvent>, PushError> {
        loop {
            let Some(message) = self.socket.next().await else {
                return Ok(None);
            };
            let text = match message? {
                Message::Text(text) => text,
                Message::Close(_) => return Ok(None),
                _ => continue,
            };

            match frame::decode(&text) {
                Ok(Frame::Ping) => {
                    self.socket.send(Message::Text(frame::PONG.into())).await?;
                }
                Ok(Frame::Connect) => return Ok(Some(PushEvent::Connected)),
                Ok(Frame::ConnectError(message)) => {
                    return Ok(Some(PushEvent::ConnectError(message)));
                }
                Ok(Frame::Disconnect) | Ok(Frame::Close) => return Ok(None),
                Ok(Frame::Event { name, data }) if name == NEW_IMAGES_EVENT => {
                    match parse_image_list(data) {
                        Ok(images) => return Ok(Some(PushEvent::NewImages(images))),
                        Err(e) => warn!("⚠️  Dropping malformed {} payload: {}", NEW_IMAGES_EVENT, e),
                    }
                }
                Ok(Frame::Event { name, .. }) => debug!("Ignoring push event {:?}", name),
                Ok(_) => {}
                Err(e) => warn!("⚠️  {}", e),
            }
        }
    }

    /// Leave the namespace and close the socket
    pub async fn close(mut self) -> Result<(), PushError> {
        self.socket.send(Message::Text(frame::DISCONNECT.into())).await?;
        self.socket.close(None).await?;
        Ok(())
    }
}

/// Run the push channel for `url` for as long as the subscription is active
pub fn subscription(url: Url) -> Subscription<PushEvent> {
    Subscription::run_with_id(url.to_string(), events(url))
}

fn events(url: Url) -> impl Stream<Item = PushEvent> {
    iced::stream::channel(100, move |mut output| async move {
        loop {
            match PushChannel::connect(&url).await {
                Ok(mut channel) => {
                    info!("🔌 Push channel open");
                    loop {
                        match channel.next_event().await {
                            Ok(Some(event)) => {
                                if output.send(event).await.is_err() {
                                    // Nobody is listening anymore
                                    let _ = channel.close().await;
                                    return;
                                }
                            }
                            Ok(None) => break,
                            Err(e) => {
                                warn!("⚠️  Push channel error: {}", e);
                                break;
                            }
                        }
                    }
                    info!("🔌 Push channel disconnected");
                    if output.send(PushEvent::Disconnected).await.is_err() {
                        return;
                    }
                }
                Err(e) => {
                    warn!("⚠️  Push channel connect failed: {}", e);
                    if output.send(PushEvent::ConnectError(e.to_string())).await.is_err() {
                        return;
                    }
                }
            }

            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    })
}
