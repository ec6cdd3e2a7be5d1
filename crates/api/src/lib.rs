//! Chorale HTTP API
//!
//! Exposes the sync action endpoint and health probe over axum. The binary in
//! `main.rs` wires configuration and logging around [`app`].

pub mod context;
pub mod routes;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub use context::AppContext;

/// Build the full application router with permissive CORS.
pub fn app(ctx: AppContext) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new().merge(routes::sync::router()).with_state(ctx).layer(cors)
}
