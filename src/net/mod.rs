/// Backend communication
///
/// - `api.rs` - typed REST client (images, config, health, derived URLs)
/// - `frame.rs` - Socket.IO text frame decoding
/// - `push.rs` - the owned push channel and its iced subscription

pub mod api;
pub mod frame;
pub mod push;

pub use api::BackendClient;
pub use push::PushEvent;
