//! `whitelist` chat command: list, add, and remove allow-list entries.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use warden_rcon::AllowlistExecutor;

use super::command_registry::{CommandHandler, UNKNOWN_COMMAND_REPLY};

pub struct WhitelistCommand {
    executor: Arc<dyn AllowlistExecutor>,
    bot_username: String,
}

impl WhitelistCommand {
    pub fn new(executor: Arc<dyn AllowlistExecutor>, bot_username: impl Into<String>) -> Self {
        Self {
            executor,
            bot_username: bot_username.into(),
        }
    }

    fn usage(&self) -> String {
        let bot = &self.bot_username;
        [
            "```".to_string(),
            format!("@{bot} whitelist"),
            "  Show this help.".to_string(),
            format!("@{bot} whitelist list"),
            "  List the whitelisted players.".to_string(),
            format!("@{bot} whitelist add <player>"),
            "  Add <player> to the whitelist.".to_string(),
            format!("@{bot} whitelist remove <player>"),
            "  Remove <player> from the whitelist.".to_string(),
            String::new(),
            "example:".to_string(),
            format!("@{bot} whitelist add hum_op"),
            "```".to_string(),
        ]
        .join("\n")
    }

    fn player_usage_hint(&self, sub_verb: &str) -> String {
        format!(
            "Specify exactly one player name: `@{} whitelist {sub_verb} <player>`",
            self.bot_username
        )
    }
}

#[async_trait]
impl CommandHandler for WhitelistCommand {
    async fn handle(&self, args: &[String]) -> Result<String> {
        let sub_verb = args.first().map(String::as_str).unwrap_or("");
        let rest = args.get(1..).unwrap_or(&[]);
        match sub_verb {
            "" => Ok(self.usage()),
            "list" => {
                let players = self.executor.list_allowed().await?;
                Ok(format!(
                    "Whitelisted players:\n```\n{}\n```\n",
                    players.join("\n")
                ))
            }
            "add" => {
                let [player] = rest else {
                    return Ok(self.player_usage_hint("add"));
                };
                self.executor.add_allowed(player).await?;
                Ok(format!("Added player `{player}` to the whitelist."))
            }
            "remove" => {
                let [player] = rest else {
                    return Ok(self.player_usage_hint("remove"));
                };
                self.executor.remove_allowed(player).await?;
                Ok(format!("Removed player `{player}` from the whitelist."))
            }
            _ => Ok(UNKNOWN_COMMAND_REPLY.to_string()),
        }
    }
}
