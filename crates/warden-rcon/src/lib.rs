//! Minecraft RCON client and the allow-list capability built on top of it.

mod allowlist;
mod rcon_client;

pub use allowlist::{AllowlistExecutor, RconAllowlist};
pub use rcon_client::{RconClient, RconError};
