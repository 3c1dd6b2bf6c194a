//! Configuration for the Infinite Craft server, resolver and client.
//!
//! Values come from three layers, later ones winning:
//!
//! 1. built-in defaults
//! 2. `config.yaml` (default: `$CONFIG_DIR/infinite-craft/config.yaml`)
//! 3. environment variables (`MONGODB_URI`, `GEMINI_API_KEY`, ...)
//!
//! Secrets are never compiled in; a missing API key only fails when the
//! generator is first built.

use craft_core::PairOrder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Directory name under the platform config/data dirs.
pub const APP_DIR: &str = "infinite-craft";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub generator: GeneratorConfig,
    pub resolver: ResolverConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Mongodb,
    Memory,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mongodb => write!(f, "mongodb"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub uri: String,
    pub database: String,
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Mongodb,
            uri: "mongodb://localhost:27017".to_string(),
            database: "infinite-craft".to_string(),
            collection: "elements".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    Openai,
}

impl ProviderKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Some(Self::Gemini),
            "openai" | "gpt" => Some(Self::Openai),
            _ => None,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-1.5-flash",
            Self::Openai => "gpt-3.5-turbo",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Self::Openai => "https://api.openai.com/v1",
        }
    }

    pub fn env_var(&self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::Openai => "OPENAI_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Openai => write!(f, "openai"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub provider: ProviderKind,
    /// Empty means the provider default.
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Empty means the provider default.
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            model: String::new(),
            api_key: None,
            endpoint: String::new(),
            timeout_secs: 30,
        }
    }
}

impl GeneratorConfig {
    pub fn model(&self) -> &str {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            &self.model
        }
    }

    pub fn endpoint(&self) -> &str {
        if self.endpoint.is_empty() {
            self.provider.default_endpoint()
        } else {
            self.endpoint.trim_end_matches('/')
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub pair_order: PairOrder,
}

/// What leaving delete mode removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteScope {
    /// Only the crafting area; discovered elements stay in the sidebar.
    #[default]
    CraftingArea,
    /// Crafting area and the known-element set.
    Everywhere,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_url: String,
    /// Local storage file; `None` means `$DATA_DIR/infinite-craft/local_storage.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,
    pub new_badge_secs: u64,
    pub error_banner_secs: u64,
    pub delete_scope: DeleteScope,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:3000".to_string(),
            storage_path: None,
            new_badge_secs: 3,
            error_banner_secs: 3,
            delete_scope: DeleteScope::CraftingArea,
        }
    }
}

impl ClientConfig {
    pub fn storage_path(&self) -> PathBuf {
        self.storage_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("local_storage.json")
        })
    }
}

impl CraftConfig {
    /// Default config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.yaml")
    }

    /// Load from `path` (or the default location) and apply env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path.is_some();
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            if explicit {
                tracing::warn!("config file {} not found, using defaults", path.display());
            }
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("CRAFT_BIND") {
            self.server.bind = bind;
        }
        if let Some(uri) = lookup("MONGODB_URI") {
            self.store.uri = uri;
        }
        if let Some(db) = lookup("CRAFT_DATABASE") {
            self.store.database = db;
        }
        if let Some(provider) = lookup("CRAFT_PROVIDER") {
            self.generator.provider =
                ProviderKind::from_str(&provider).ok_or(ConfigError::InvalidEnv {
                    key: "CRAFT_PROVIDER",
                    value: provider,
                })?;
        }
        if let Some(model) = lookup("CRAFT_MODEL") {
            self.generator.model = model;
        }
        if self.generator.api_key.is_none() {
            self.generator.api_key = lookup(self.generator.provider.env_var());
        }
        if let Some(order) = lookup("CRAFT_PAIR_ORDER") {
            self.resolver.pair_order =
                PairOrder::from_str(&order).ok_or(ConfigError::InvalidEnv {
                    key: "CRAFT_PAIR_ORDER",
                    value: order,
                })?;
        }
        if let Some(url) = lookup("CRAFT_API_URL") {
            self.client.api_url = url;
        }
        if let Some(path) = lookup("CRAFT_STORAGE") {
            self.client.storage_path = Some(PathBuf::from(path));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CraftConfig::default();
        assert_eq!(config.store.database, "infinite-craft");
        assert_eq!(config.store.collection, "elements");
        assert_eq!(config.generator.model(), "gemini-1.5-flash");
        assert_eq!(config.resolver.pair_order, PairOrder::Unordered);
        assert_eq!(config.client.new_badge_secs, 3);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "store:\n  backend: memory\nresolver:\n  pair_order: ordered\n";
        let config = CraftConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.collection, "elements");
        assert_eq!(config.resolver.pair_order, PairOrder::Ordered);
        assert_eq!(config.server.bind, "127.0.0.1:3000");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = CraftConfig::default();
        config
            .apply_env(env(&[
                ("MONGODB_URI", "mongodb://db:27017"),
                ("CRAFT_PROVIDER", "openai"),
                ("OPENAI_API_KEY", "sk-test"),
                ("GEMINI_API_KEY", "ignored"),
            ]))
            .unwrap();
        assert_eq!(config.store.uri, "mongodb://db:27017");
        assert_eq!(config.generator.provider, ProviderKind::Openai);
        assert_eq!(config.generator.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.generator.model(), "gpt-3.5-turbo");
    }

    #[test]
    fn test_file_key_beats_env_key() {
        let mut config = CraftConfig::default();
        config.generator.api_key = Some("from-file".into());
        config
            .apply_env(env(&[("GEMINI_API_KEY", "from-env")]))
            .unwrap();
        assert_eq!(config.generator.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_invalid_env_value() {
        let mut config = CraftConfig::default();
        let err = config
            .apply_env(env(&[("CRAFT_PAIR_ORDER", "diagonal")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: "CRAFT_PAIR_ORDER", .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "server:\n  bind: 0.0.0.0:8080\nclient:\n  delete_scope: everywhere\n").unwrap();

        let config = CraftConfig::from_file(&path).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.client.delete_scope, DeleteScope::Everywhere);
    }

    #[test]
    fn test_endpoint_trims_slash() {
        let mut generator = GeneratorConfig::default();
        generator.endpoint = "http://localhost:8080/v1/".into();
        assert_eq!(generator.endpoint(), "http://localhost:8080/v1");
    }
}
