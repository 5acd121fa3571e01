use anyhow::Result;
use clap::Parser;
use log::error;

use powermon::cli::{self, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = cli::run(cli).await {
        error!("❌ {}", e);
        std::process::exit(1);
    }

    Ok(())
}
