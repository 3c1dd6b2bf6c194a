//! Text generation for element discovery.
//!
//! The resolver only needs "prompt in, text out". Each provider hides its
//! own request and response shapes behind [`Generator`].

pub mod gemini;
pub mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

use async_trait::async_trait;
use craft_config::{GeneratorConfig, ProviderKind};
use std::sync::Arc;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, GenerationError>;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("{0} not set. Export your API key or set generator.api_key.")]
    MissingApiKey(&'static str),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{provider} returned HTTP {status}: {message}")]
    Status {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("{0} returned no text")]
    EmptyResponse(&'static str),
}

/// Opaque text-completion service
#[async_trait]
pub trait Generator: Send + Sync {
    /// Provider identifier
    fn name(&self) -> &str;

    /// Model identifier sent upstream
    fn model(&self) -> &str;

    /// Complete `prompt`, returning the raw text.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Build the generator selected by `config`.
pub fn from_config(config: &GeneratorConfig) -> Result<Arc<dyn Generator>> {
    let api_key = config
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .ok_or(GenerationError::MissingApiKey(config.provider.env_var()))?;
    let http = http_client(config.timeout_secs)?;

    let generator: Arc<dyn Generator> = match config.provider {
        ProviderKind::Gemini => Arc::new(GeminiClient::new(
            http,
            config.endpoint(),
            config.model(),
            api_key,
        )),
        ProviderKind::Openai => Arc::new(OpenAiClient::new(
            http,
            config.endpoint(),
            config.model(),
            api_key,
        )),
    };
    tracing::info!(
        provider = generator.name(),
        model = generator.model(),
        "generator ready"
    );
    Ok(generator)
}

fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(timeout_secs));
    }
    Ok(builder.build()?)
}

/// Pull a readable message out of an upstream error body.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key() {
        let config = GeneratorConfig::default();
        match from_config(&config) {
            Err(GenerationError::MissingApiKey(var)) => assert_eq!(var, "GEMINI_API_KEY"),
            _ => panic!("expected missing key"),
        }
    }

    #[test]
    fn test_blank_key_is_missing() {
        let mut config = GeneratorConfig::default();
        config.provider = ProviderKind::Openai;
        config.api_key = Some("  ".into());
        assert!(matches!(
            from_config(&config),
            Err(GenerationError::MissingApiKey("OPENAI_API_KEY"))
        ));
    }

    #[test]
    fn test_builds_selected_provider() {
        let mut config = GeneratorConfig::default();
        config.api_key = Some("key".into());
        let generator = from_config(&config).unwrap();
        assert_eq!(generator.name(), "gemini");
        assert_eq!(generator.model(), "gemini-1.5-flash");
    }

    #[test]
    fn test_error_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(error_message(body), "API key not valid");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }
}
