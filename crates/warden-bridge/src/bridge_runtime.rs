//! Reconnecting chat-event loop and the per-event dispatch pipeline.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use warden_mattermost::{decode_posted_payload, Post, WsEventEnvelope, POSTED_EVENT_KIND};
use warden_rcon::AllowlistExecutor;

mod command_registry;
mod mattermost_transport;
mod whitelist_command;

pub use command_registry::{CommandHandler, CommandInvocation, CommandRegistry};
pub use mattermost_transport::MattermostTransport;
pub use whitelist_command::WhitelistCommand;

#[async_trait]
/// Chat-service seam the loop consumes: one streaming connection at a
/// time plus plain text posts.
pub trait ChatTransport: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn EventStream>>;
    async fn post(&self, channel_id: &str, message: &str) -> Result<()>;
}

#[async_trait]
pub trait EventStream: Send {
    /// Next inbound envelope; None once the stream has ended.
    async fn next_event(&mut self) -> Option<WsEventEnvelope>;
}

/// Identity the bridge is bound to for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct BotIdentity {
    pub user_id: String,
    pub username: String,
    pub channel_id: String,
}

#[derive(Clone)]
/// Runtime configuration assembled once at startup and handed to the loop.
pub struct BridgeRuntimeConfig {
    pub transport: Arc<dyn ChatTransport>,
    pub executor: Arc<dyn AllowlistExecutor>,
    pub identity: BotIdentity,
    pub reconnect_delay: Duration,
}

/// Runs the bridge until the process is told to stop.
pub async fn run_bridge(config: BridgeRuntimeConfig) -> Result<()> {
    let mut runtime = BridgeRuntime::new(config);
    runtime.run().await
}

pub struct BridgeRuntime {
    transport: Arc<dyn ChatTransport>,
    registry: Arc<CommandRegistry>,
    identity: BotIdentity,
    reconnect_delay: Duration,
}

impl BridgeRuntime {
    pub fn new(config: BridgeRuntimeConfig) -> Self {
        let mut registry = CommandRegistry::new();
        registry.register(
            "whitelist",
            Arc::new(WhitelistCommand::new(
                config.executor.clone(),
                config.identity.username.clone(),
            )),
        );
        Self::with_registry(config, registry)
    }

    /// Builds a runtime around a caller-provided handler set.
    pub fn with_registry(config: BridgeRuntimeConfig, registry: CommandRegistry) -> Self {
        Self {
            transport: config.transport,
            registry: Arc::new(registry),
            identity: config.identity,
            reconnect_delay: config.reconnect_delay,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut fail_count: u64 = 0;
        loop {
            let Some(mut stream) =
                connect_with_retry(self.transport.as_ref(), self.reconnect_delay, &mut fail_count)
                    .await
            else {
                tracing::info!("bridge shutdown requested");
                return Ok(());
            };

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("bridge shutdown requested");
                        return Ok(());
                    }
                    maybe_event = stream.next_event() => {
                        let Some(envelope) = maybe_event else { break };
                        let task = EventTask {
                            transport: self.transport.clone(),
                            registry: self.registry.clone(),
                            identity: self.identity.clone(),
                        };
                        tokio::spawn(async move { task.handle(envelope).await });
                    }
                }
            }
            tracing::warn!("chat event stream ended, reconnecting");
        }
    }
}

// Retries forever on a fixed cadence; the counter only feeds the log line.
// None means shutdown was requested while waiting.
async fn connect_with_retry(
    transport: &dyn ChatTransport,
    reconnect_delay: Duration,
    fail_count: &mut u64,
) -> Option<Box<dyn EventStream>> {
    loop {
        match transport.connect().await {
            Ok(stream) => {
                *fail_count = 0;
                tracing::info!("chat event stream connected");
                return Some(stream);
            }
            Err(error) => {
                *fail_count += 1;
                tracing::warn!(
                    fail_count = *fail_count,
                    "failed to connect chat event stream: {error:#}"
                );
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => return None,
                    _ = tokio::time::sleep(reconnect_delay) => {}
                }
            }
        }
    }
}

struct EventTask {
    transport: Arc<dyn ChatTransport>,
    registry: Arc<CommandRegistry>,
    identity: BotIdentity,
}

impl EventTask {
    async fn handle(&self, envelope: WsEventEnvelope) {
        let Some(post) = relevant_post(&envelope, &self.identity) else {
            return;
        };
        let Some(invocation) = CommandInvocation::parse(&post.message) else {
            // TODO: answer a bare mention with the whitelist help text.
            return;
        };
        let reply = self.registry.dispatch(&invocation).await;
        if let Err(error) = self.transport.post(&self.identity.channel_id, &reply).await {
            tracing::error!("failed to post command reply: {error:#}");
        }
    }
}

// Relevance checks in order; any failing check drops the event with no
// reply. Only the undecodable payload is worth a log line.
fn relevant_post(envelope: &WsEventEnvelope, identity: &BotIdentity) -> Option<Post> {
    if envelope.event != POSTED_EVENT_KIND {
        return None;
    }
    let post = match decode_posted_payload(envelope) {
        Ok(post) => post,
        Err(error) => {
            tracing::warn!("failed to decode posted event payload: {error}");
            return None;
        }
    };
    if post.user_id == identity.user_id {
        return None;
    }
    if post.channel_id != identity.channel_id {
        return None;
    }
    if !post.message.starts_with(&mention_token(&identity.username)) {
        return None;
    }
    Some(post)
}

fn mention_token(username: &str) -> String {
    format!("@{username}")
}
