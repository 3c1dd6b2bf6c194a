//! Infinite Craft HTTP API
//!
//! | Method | Path           | Purpose                               |
//! |--------|----------------|---------------------------------------|
//! | GET    | `/api/combine` | Resolve `element1` + `element2`       |
//! | GET    | `/api/health`  | Store and generator status            |

pub mod error;
pub mod routes;

pub use error::WebError;

use axum::Router;
use craft_resolver::Resolver;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub resolver: Resolver,
    pub started: Instant,
}

impl AppState {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            started: Instant::now(),
        }
    }
}

/// Create the router with all routes
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::combine::router())
        .merge(routes::health::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: Arc<AppState>, addr: &str) -> std::io::Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Infinite Craft API listening on http://{}", addr);

    axum::serve(listener, app).await
}
