//! Mattermost websocket event stream with challenge-based authentication.

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream,
};

use crate::types::{MattermostError, WsEventEnvelope};

const WEBSOCKET_PATH: &str = "/api/v4/websocket";

/// Live event stream over one websocket connection. Dropped and redialed
/// by the caller whenever it ends.
pub struct MattermostEventStream {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

/// Connects to the event stream and authenticates with the bearer token
/// via the server's challenge message.
pub async fn connect_event_stream(
    ws_url: &str,
    token: &str,
) -> Result<MattermostEventStream, MattermostError> {
    let url = format!("{}{}", ws_url.trim_end_matches('/'), WEBSOCKET_PATH);
    let (mut socket, _response) = connect_async(&url).await?;

    let challenge = json!({
        "seq": 1,
        "action": "authentication_challenge",
        "data": { "token": token },
    })
    .to_string();
    socket.send(WsMessage::Text(challenge.into())).await?;

    Ok(MattermostEventStream { socket })
}

impl MattermostEventStream {
    /// Yields the next event envelope. Control frames, sequence replies,
    /// and malformed frames are skipped; None means the stream ended.
    pub async fn next_event(&mut self) -> Option<WsEventEnvelope> {
        loop {
            let message = match self.socket.next().await {
                Some(Ok(message)) => message,
                Some(Err(error)) => {
                    tracing::warn!("websocket receive failed: {error}");
                    return None;
                }
                None => return None,
            };
            match parse_event_frame(message) {
                // Frames without an event tag are auth and seq replies.
                Ok(Some(envelope)) if envelope.event.is_empty() => continue,
                Ok(Some(envelope)) => return Some(envelope),
                Ok(None) => continue,
                Err(error) => {
                    tracing::warn!("discarding malformed websocket frame: {error}");
                    continue;
                }
            }
        }
    }
}

fn parse_event_frame(message: WsMessage) -> Result<Option<WsEventEnvelope>, MattermostError> {
    match message {
        WsMessage::Text(text) => {
            let envelope = serde_json::from_str::<WsEventEnvelope>(&text)?;
            Ok(Some(envelope))
        }
        WsMessage::Binary(bytes) => {
            let text = String::from_utf8(bytes.to_vec()).map_err(|_| {
                MattermostError::InvalidPayload("non-utf8 websocket frame".to_string())
            })?;
            let envelope = serde_json::from_str::<WsEventEnvelope>(&text)?;
            Ok(Some(envelope))
        }
        WsMessage::Ping(_) | WsMessage::Pong(_) => Ok(None),
        WsMessage::Close(_) => Ok(None),
        WsMessage::Frame(_) => Ok(None),
    }
}
