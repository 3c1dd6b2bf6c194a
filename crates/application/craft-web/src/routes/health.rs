use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde_json::json;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/health", get(api_health))
}

async fn api_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = state.resolver.store();
    let generator = state.resolver.generator();

    let store_ok = match store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "store ping failed");
            false
        }
    };
    let records = if store_ok {
        store.count().await.ok()
    } else {
        None
    };

    Json(json!({
        "status": if store_ok { "ok" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.started.elapsed().as_secs(),
        "store": { "backend": store.backend(), "ok": store_ok },
        "generator": { "provider": generator.name(), "model": generator.model() },
        "pair_order": state.resolver.order().to_string(),
        "records": records,
        "in_flight": state.resolver.in_flight(),
    }))
}
