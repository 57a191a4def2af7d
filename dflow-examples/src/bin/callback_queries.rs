//! Quiz bot answered with inline keyboard buttons (callback queries).

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use dflow_examples::cli::{load_config, Cli, Commands};
use dflow_examples::scripts::callback_script;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = load_config(token)?;
            dflow_telegram::run_dialog_bot(config, Arc::new(callback_script()?)).await
        }
    }
}
