//! Mattermost-backed implementation of the transport seams.

use anyhow::{Context, Result};
use async_trait::async_trait;
use warden_mattermost::{
    connect_event_stream, MattermostClient, MattermostEventStream, WsEventEnvelope,
};

use super::{ChatTransport, EventStream};

pub struct MattermostTransport {
    client: MattermostClient,
    ws_url: String,
    token: String,
}

impl MattermostTransport {
    pub fn new(
        client: MattermostClient,
        ws_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            ws_url: ws_url.into(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl ChatTransport for MattermostTransport {
    async fn connect(&self) -> Result<Box<dyn EventStream>> {
        let stream = connect_event_stream(&self.ws_url, &self.token)
            .await
            .context("failed to connect mattermost websocket")?;
        Ok(Box::new(MattermostStream { inner: stream }))
    }

    async fn post(&self, channel_id: &str, message: &str) -> Result<()> {
        self.client
            .create_post(channel_id, message)
            .await
            .context("failed to create mattermost post")
    }
}

struct MattermostStream {
    inner: MattermostEventStream,
}

#[async_trait]
impl EventStream for MattermostStream {
    async fn next_event(&mut self) -> Option<WsEventEnvelope> {
        self.inner.next_event().await
    }
}
