mod cli;
mod commands;
mod server;

use clap::Parser;
use human_panic::setup_panic;

use crate::cli::{Cli, run_cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_panic!();
    // Initialize tracing
    shared::logging::configure_logging()?;

    let cli = Cli::parse();

    run_cli(cli).await
}
