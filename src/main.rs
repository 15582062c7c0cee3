use crate::config::{load_config, VERSION};
use log::{error, info};
use std::sync::Arc;

mod config;
mod database;
mod http;
mod middleware;
mod services;
mod utils;

#[tokio::main]
async fn main() {
    // Load configuration
    let config = load_config().unwrap_or_default();

    // Initialize logging
    utils::logging::setup(config.logging, &config.logging_dir);

    info!("Starting FIFA Player Stats Server v{VERSION}");

    // Connect to the database, importing the configured sources on first run
    let db = database::init(&config).await;

    let config = Arc::new(config);
    if let Err(err) = http::start_server(config, db).await {
        error!("HTTP server stopped with an error: {}", err);
    }
}
