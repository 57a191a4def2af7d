//! Picture bot: replies to photos with a picture and to stickers with a gallery.
//! The picture is read from the local file named by PICTURE_PATH.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use dflow_examples::cli::{load_config, Cli, Commands};
use dflow_examples::scripts::pictures_script;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = load_config(token)?;
            let picture = std::env::var("PICTURE_PATH")
                .map(PathBuf::from)
                .map_err(|_| anyhow::anyhow!("PICTURE_PATH not set"))?;
            if !picture.exists() {
                anyhow::bail!("PICTURE_PATH {} does not exist", picture.display());
            }
            dflow_telegram::run_dialog_bot(config, Arc::new(pictures_script(picture)?)).await
        }
    }
}
