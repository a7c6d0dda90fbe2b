use anyhow::Result;
use clap::Parser;
use market_alert::{cli::Cli, run};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    run(cli).await
}
