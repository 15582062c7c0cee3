//! HTTP server hosting the player card API

use crate::{config::Config, database::DatabaseConnection};
use axum::Extension;
use log::{error, info};
use std::{io, net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, signal};

mod routes;

/// Starts the HTTP server, runs until a Ctrl+C signal is received
///
/// `config` The server configuration
/// `db`     The database connection shared with the route handlers
pub async fn start_server(config: Arc<Config>, db: DatabaseConnection) -> io::Result<()> {
    routes::set_expose_errors(config.api.expose_errors);

    let addr = SocketAddr::new(config.host, config.port);
    let router = routes::router()
        .layer(Extension(db))
        .layer(Extension(config));

    let listener = match TcpListener::bind(addr).await {
        Ok(value) => value,
        Err(err) => {
            error!("Failed to bind HTTP server on {}: {:?}", addr, err);
            return Err(err);
        }
    };

    info!("Starting HTTP server on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server shut down");
    Ok(())
}

/// Completes once the process receives Ctrl+C
async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
        // Keep serving rather than stopping immediately
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
