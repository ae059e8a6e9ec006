//! Process entry point: configuration, identity lookups, then the bridge loop.

mod bootstrap_helpers;
mod bridge_config;
mod cli_args;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use warden_bridge::{run_bridge, BotIdentity, BridgeRuntimeConfig, MattermostTransport};
use warden_mattermost::MattermostClient;
use warden_rcon::{RconAllowlist, RconClient};

use crate::bootstrap_helpers::init_tracing;
use crate::bridge_config::load_bridge_config;
use crate::cli_args::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_bridge_config(&cli.config)?;

    let client = MattermostClient::new(&config.chat.api_base, &config.chat.token)
        .context("failed to construct mattermost client")?;
    let me = client
        .get_me()
        .await
        .context("failed to look up the bot user")?;
    let channel = client
        .get_channel(&config.chat.channel_id)
        .await
        .context("failed to look up the bound channel")?;
    tracing::info!(username = %me.username, channel = %channel.id, "bridge identity resolved");

    let executor = Arc::new(RconAllowlist::new(RconClient::new(
        config.rcon.host.clone(),
        config.rcon.port,
        config.rcon.password.clone(),
    )));
    let transport = Arc::new(MattermostTransport::new(
        client,
        config.chat.ws_url.clone(),
        config.chat.token.clone(),
    ));

    run_bridge(BridgeRuntimeConfig {
        transport,
        executor,
        identity: BotIdentity {
            user_id: me.id,
            username: me.username,
            channel_id: channel.id,
        },
        reconnect_delay: Duration::from_secs(config.bridge.reconnect_delay_seconds),
    })
    .await
}
