//! Ways to ask for a combination.

use std::sync::Arc;

use async_trait::async_trait;
use craft_core::CombineResponse;
use craft_resolver::Resolver;
use serde::Deserialize;

use crate::{ClientError, Result};

#[async_trait]
pub trait CombineClient: Send + Sync {
    async fn combine(&self, first: &str, second: &str) -> Result<CombineResponse>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Calls `GET /api/combine` on a running server.
#[derive(Clone)]
pub struct HttpCombineClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpCombineClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn url(&self) -> String {
        format!("{}/api/combine", self.base_url)
    }
}

#[async_trait]
impl CombineClient for HttpCombineClient {
    async fn combine(&self, first: &str, second: &str) -> Result<CombineResponse> {
        let response = self
            .http
            .get(self.url())
            .query(&[("element1", first), ("element2", second)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            tracing::warn!(status = status.as_u16(), error = %message, "combine request rejected");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

/// Resolves in-process, skipping HTTP.
#[derive(Clone)]
pub struct LocalCombineClient {
    resolver: Arc<Resolver>,
}

impl LocalCombineClient {
    pub fn new(resolver: Arc<Resolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl CombineClient for LocalCombineClient {
    async fn combine(&self, first: &str, second: &str) -> Result<CombineResponse> {
        let resolution = self.resolver.resolve(first, second).await?;
        Ok(resolution.into())
    }
}
