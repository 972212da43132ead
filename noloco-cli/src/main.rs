use anyhow::Result;
use clap::Parser;

use noloco_cli::cli::{self, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Cli::parse();
    log::debug!("{:?}", args.command);

    cli::run(args).await
}
