//! Bridge runtime: reconnecting event loop, event filter, and command
//! dispatch for chat-driven game-server administration.

mod bridge_runtime;

pub use bridge_runtime::{
    run_bridge, BotIdentity, BridgeRuntime, BridgeRuntimeConfig, ChatTransport, CommandHandler,
    CommandInvocation, CommandRegistry, EventStream, MattermostTransport, WhitelistCommand,
};
