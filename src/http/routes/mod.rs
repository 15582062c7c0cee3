use crate::middleware::cors::cors_layer;
use axum::{middleware, Router};

mod players;
mod server;

pub use players::set_expose_errors;

/// Creates the application router with all the routes, shared state
/// is expected to be provided as extension layers by the caller
pub fn router() -> Router {
    Router::new().nest("/api", api_router())
}

/// Creates a router for the routes that reside under /api
fn api_router() -> Router {
    Router::new()
        // Player card routing
        .nest("/fifa-players", players::router())
        // Server details routes
        .nest("/server", server::router())
        // CORS middleware is applied to all API routes to allow browser access
        .layer(middleware::from_fn(cors_layer))
}
