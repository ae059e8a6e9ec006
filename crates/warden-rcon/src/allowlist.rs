//! Allow-list capability implemented over RCON `whitelist` commands.

use async_trait::async_trait;

use crate::rcon_client::{RconClient, RconError};

#[async_trait]
/// Capability seam for the game server's allow-list verbs.
pub trait AllowlistExecutor: Send + Sync {
    async fn list_allowed(&self) -> Result<Vec<String>, RconError>;
    async fn add_allowed(&self, player: &str) -> Result<(), RconError>;
    async fn remove_allowed(&self, player: &str) -> Result<(), RconError>;
}

pub struct RconAllowlist {
    client: RconClient,
}

impl RconAllowlist {
    pub fn new(client: RconClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AllowlistExecutor for RconAllowlist {
    async fn list_allowed(&self) -> Result<Vec<String>, RconError> {
        let response = self.client.exec("whitelist list").await?;
        Ok(parse_whitelist_names(&response))
    }

    async fn add_allowed(&self, player: &str) -> Result<(), RconError> {
        let response = self.client.exec(&format!("whitelist add {player}")).await?;
        expect_confirmation(&response, "Added")
    }

    async fn remove_allowed(&self, player: &str) -> Result<(), RconError> {
        let response = self
            .client
            .exec(&format!("whitelist remove {player}"))
            .await?;
        expect_confirmation(&response, "Removed")
    }
}

// "There are 2 whitelisted player(s): alpha, beta"; the no-player variant
// carries no colon.
fn parse_whitelist_names(response: &str) -> Vec<String> {
    let Some((_, names)) = response.split_once(':') else {
        return Vec::new();
    };
    names
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

// The server confirms mutations in prose; anything else (already
// whitelisted, unknown player) is a rejection worth relaying verbatim.
fn expect_confirmation(response: &str, marker: &str) -> Result<(), RconError> {
    if response.contains(marker) {
        return Ok(());
    }
    Err(RconError::CommandRejected(response.trim().to_string()))
}
