//! `GET /api/combine?element1=<name>&element2=<name>`

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use craft_core::CombineResponse;
use serde::Deserialize;

use crate::{AppState, WebError};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/combine", get(api_combine))
}

#[derive(Deserialize)]
struct CombineQuery {
    element1: Option<String>,
    element2: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn api_combine(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CombineQuery>, QueryRejection>,
) -> Result<Json<CombineResponse>, WebError> {
    let Query(q) = query.map_err(|e| WebError::BadQuery(e.body_text()))?;
    let (Some(first), Some(second)) = (present(q.element1), present(q.element2)) else {
        return Err(WebError::MissingParameter);
    };

    let resolution = state.resolver.resolve(&first, &second).await?;
    Ok(Json(resolution.into()))
}
