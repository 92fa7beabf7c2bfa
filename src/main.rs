use anyhow::Context;
use clap::Parser;
use measurement_processor::cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).await.context("measurement-processor failed")
}
