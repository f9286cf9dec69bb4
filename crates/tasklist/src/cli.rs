use std::error::Error;

use clap::{Parser, Subcommand};

use crate::commands::{self, serve::ServeParams};
use shared::error::CommonError;

pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the tasklist API server
    Serve(ServeParams),
    /// Print the OpenAPI document for the HTTP surface
    #[command(name = "openapi-spec")]
    OpenapiSpec,
    /// Show tasklist version
    Version,
}

fn log_error_chain(err: &(dyn Error)) {
    let mut current: Option<&(dyn Error)> = Some(err);

    while let Some(e) = current {
        eprintln!("Caused by: {e}");
        current = e.source();
    }
}

fn handle_error(err: &CommonError) {
    eprintln!("Error: {err}");
    log_error_chain(err);
    ::std::process::exit(1);
}

pub async fn run_cli(cli: Cli) -> Result<(), anyhow::Error> {
    let cmd_res = match cli.command {
        Commands::Serve(params) => commands::serve::cmd_serve(params).await,
        Commands::OpenapiSpec => commands::openapi::cmd_openapi_spec(),
        Commands::Version => {
            println!("tasklist CLI version: {CLI_VERSION}");
            Ok(())
        }
    };

    if let Err(e) = cmd_res {
        handle_error(&e);
    }
    Ok(())
}
