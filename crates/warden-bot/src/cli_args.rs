use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "warden-bot",
    about = "Mattermost bridge for Minecraft allow-list administration",
    version
)]
pub struct Cli {
    #[arg(
        long,
        env = "WARDEN_CONFIG",
        default_value = "config.toml",
        help = "Path to the bridge configuration file."
    )]
    pub config: PathBuf,
}
