/// Socket.IO text frames
///
/// The backend pushes over Socket.IO v5 on top of Engine.IO v4. Over a
/// websocket every message is one text frame: an Engine.IO packet type
/// digit, and for `4` (message) a Socket.IO packet type digit, followed by
/// an optional JSON body.
///
/// - `0{...}` open, `1` close, `2` ping, `3` pong
/// - `40` connect, `41` disconnect, `42[name, data]` event, `44{...}` connect error
use serde::Deserialize;
use serde_json::Value;

use crate::error::PushError;

/// Join the default namespace
pub const CONNECT: &str = "40";
/// Leave the default namespace
pub const DISCONNECT: &str = "41";
/// Answer to a server ping
pub const PONG: &str = "3";

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Open(Handshake),
    Close,
    Ping,
    Pong,
    Connect,
    Disconnect,
    Event { name: String, data: Value },
    ConnectError(String),
    /// Upgrade/noop packets and acks, which the client has no use for
    Ignored,
}

/// Body of the Engine.IO open packet
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

/// Parse one websocket text frame
pub fn decode(text: &str) -> Result<Frame, PushError> {
    let mut chars = text.chars();
    let malformed = || PushError::Frame(text.to_string());

    match chars.next() {
        Some('0') => {
            let handshake = serde_json::from_str(chars.as_str()).map_err(|_| malformed())?;
            Ok(Frame::Open(handshake))
        }
        Some('1') => Ok(Frame::Close),
        Some('2') => Ok(Frame::Ping),
        Some('3') => Ok(Frame::Pong),
        Some('5') | Some('6') => Ok(Frame::Ignored),
        Some('4') => decode_socket_packet(chars.as_str()).ok_or_else(malformed),
        _ => Err(malformed()),
    }
}

fn decode_socket_packet(packet: &str) -> Option<Frame> {
    let mut chars = packet.chars();
    let kind = chars.next()?;
    let body = skip_namespace(chars.as_str());

    match kind {
        '0' => Some(Frame::Connect),
        '1' => Some(Frame::Disconnect),
        '2' => {
            // Optional ack id before the array
            let body = body.trim_start_matches(|c: char| c.is_ascii_digit());
            let Value::Array(mut items) = serde_json::from_str(body).ok()? else {
                return None;
            };
            if items.is_empty() {
                return None;
            }
            let Value::String(name) = items.remove(0) else {
                return None;
            };
            let data = if items.is_empty() {
                Value::Null
            } else {
                items.remove(0)
            };
            Some(Frame::Event { name, data })
        }
        '3' | '5' | '6' => Some(Frame::Ignored),
        '4' => {
            let message = serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|v| match v {
                    Value::Object(map) => map.get("message").and_then(Value::as_str).map(str::to_string),
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .unwrap_or_else(|| "connection refused".to_string());
            Some(Frame::ConnectError(message))
        }
        _ => None,
    }
}

/// Drop a `/namespace,` prefix if present
fn skip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        match body.find(',') {
            Some(comma) => &body[comma + 1..],
            None => "",
        }
    } else {
        body
    }
}
