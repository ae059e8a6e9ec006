//! Mattermost REST and websocket transport used by the bridge runtime.

mod mattermost_client;
mod mattermost_ws;
mod types;

pub use mattermost_client::MattermostClient;
pub use mattermost_ws::{connect_event_stream, MattermostEventStream};
pub use types::{
    decode_posted_payload, MattermostChannel, MattermostError, MattermostUser, Post,
    WsEventEnvelope, POSTED_EVENT_KIND,
};
