//! Mention tokenization and name-based handler dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

pub(crate) const UNKNOWN_COMMAND_REPLY: &str = "Unknown command.";

/// One parsed mention: the command name and its arguments in posted order.
/// Lives only for the duration of a single dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub command: String,
    pub args: Vec<String>,
}

impl CommandInvocation {
    /// Tokenizes a mention message on single spaces, trimming every token
    /// and dropping the leading mention. Returns None for the bare
    /// mention, which deliberately draws no reply.
    pub fn parse(message: &str) -> Option<Self> {
        let mut tokens = message.split(' ').map(|token| token.trim().to_string());
        let _mention = tokens.next()?;
        let command = tokens.next()?;
        Some(Self {
            command,
            args: tokens.collect(),
        })
    }
}

#[async_trait]
/// Trait contract for one chat-administered capability.
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, args: &[String]) -> Result<String>;
}

/// Maps command names to handler capabilities. Unmatched names get the
/// fixed fallback reply — unlike the event filter, the dispatcher never
/// drops silently.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    /// Resolves and runs the handler; always yields a reply. A handler
    /// failure is logged and its display text becomes the reply.
    pub async fn dispatch(&self, invocation: &CommandInvocation) -> String {
        let Some(handler) = self.handlers.get(&invocation.command) else {
            return UNKNOWN_COMMAND_REPLY.to_string();
        };
        match handler.handle(&invocation.args).await {
            Ok(reply) => reply,
            Err(error) => {
                tracing::error!(
                    command = %invocation.command,
                    "command handler failed: {error:#}"
                );
                error.to_string()
            }
        }
    }
}
