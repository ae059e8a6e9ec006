//! TOML configuration file for the bridge process.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

fn default_reconnect_delay_seconds() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    pub api_base: String,
    pub ws_url: String,
    pub token: String,
    pub channel_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RconConfig {
    pub host: String,
    pub port: u16,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BridgeTuning {
    #[serde(default = "default_reconnect_delay_seconds")]
    pub reconnect_delay_seconds: u64,
}

impl Default for BridgeTuning {
    fn default() -> Self {
        Self {
            reconnect_delay_seconds: default_reconnect_delay_seconds(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    pub chat: ChatConfig,
    pub rcon: RconConfig,
    #[serde(default)]
    pub bridge: BridgeTuning,
}

pub fn load_bridge_config(path: &Path) -> Result<BridgeConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = toml::from_str::<BridgeConfig>(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    validate_bridge_config(&config)?;
    Ok(config)
}

fn validate_bridge_config(config: &BridgeConfig) -> Result<()> {
    if config.chat.api_base.trim().is_empty() {
        bail!("chat.api_base must not be empty");
    }
    if config.chat.ws_url.trim().is_empty() {
        bail!("chat.ws_url must not be empty");
    }
    if config.chat.token.trim().is_empty() {
        bail!("chat.token must not be empty");
    }
    if config.chat.channel_id.trim().is_empty() {
        bail!("chat.channel_id must not be empty");
    }
    if config.rcon.host.trim().is_empty() {
        bail!("rcon.host must not be empty");
    }
    if config.rcon.port == 0 {
        bail!("rcon.port must be greater than 0");
    }
    if config.rcon.password.trim().is_empty() {
        bail!("rcon.password must not be empty");
    }
    if config.bridge.reconnect_delay_seconds == 0 {
        bail!("bridge.reconnect_delay_seconds must be greater than 0");
    }
    Ok(())
}
