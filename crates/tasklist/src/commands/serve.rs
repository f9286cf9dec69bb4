use clap::Args;
use tracing::info;
use url::Url;

use crate::server::{StartAxumServerParams, start_axum_server};
use shared::error::CommonError;
use tasklist_api_server::{ApiService, repository::setup_repository};

#[derive(Args)]
pub struct ServeParams {
    /// Host interface to bind
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,
    /// libsql connection string for the todo store
    #[arg(long, env = "DB_URL", default_value = "libsql://./tasklist.db?mode=local")]
    pub db_url: Url,
}

pub async fn cmd_serve(params: ServeParams) -> Result<(), CommonError> {
    // An unreachable store at startup is fatal: the error propagates to the
    // CLI error handler, which prints the chain and exits non-zero.
    let (_db, _conn, repository) = setup_repository(&params.db_url).await?;

    let api_service = ApiService::new(repository);

    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);

    let (server_fut, _handle, addr) = start_axum_server(StartAxumServerParams {
        host: params.host,
        port: params.port,
        system_shutdown_signal_rx: shutdown_rx,
        api_service,
    })
    .await?;

    info!("tasklist API listening on {}", addr);

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {e}");
        }
        let _ = shutdown_tx.send(());
    });

    server_fut.await?;

    info!("Server stopped");
    Ok(())
}
