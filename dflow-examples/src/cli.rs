//! CLI parser and config loading shared by the demo bots.

use anyhow::Result;
use clap::{Parser, Subcommand};
use dflow_telegram::TelegramConfig;
use std::env;

#[derive(Parser)]
#[command(about = "Dialog-flow Telegram demo bot", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
}

/// Load TelegramConfig from environment. If `token` is provided it overrides BOT_TOKEN.
pub fn load_config(token: Option<String>) -> Result<TelegramConfig> {
    TelegramConfig::from_lookup(|key| match (key, &token) {
        ("BOT_TOKEN", Some(token)) => Some(token.clone()),
        _ => env::var(key).ok(),
    })
}
