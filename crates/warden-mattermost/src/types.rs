//! Shared Mattermost wire types and the transport error enum.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
/// Enumerates failures of the Mattermost transport layer.
pub enum MattermostError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("mattermost returned non-success status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("invalid event payload: {0}")]
    InvalidPayload(String),
}

/// Bot-side view of a Mattermost user account.
#[derive(Debug, Clone, Deserialize)]
pub struct MattermostUser {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MattermostChannel {
    pub id: String,
}

/// Event kind carrying a message payload; every other kind is noise to
/// the bridge.
pub const POSTED_EVENT_KIND: &str = "posted";

/// One websocket event envelope as delivered by the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WsEventEnvelope {
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub seq: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub root_id: String,
}

/// The `posted` payload embeds the post as a JSON-encoded string under
/// `data.post`; both layers have to decode.
pub fn decode_posted_payload(envelope: &WsEventEnvelope) -> Result<Post, MattermostError> {
    let raw = envelope
        .data
        .get("post")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| {
            MattermostError::InvalidPayload("posted event without post field".to_string())
        })?;
    Ok(serde_json::from_str(raw)?)
}
