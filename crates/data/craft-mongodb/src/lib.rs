//! Persisted combination cache.
//!
//! One collection of [`CombinationRecord`]s, queried by parent pair and
//! appended to on cache misses. The hosting process opens the store once and
//! hands an `Arc<dyn CombinationStore>` to whatever needs it.

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use async_trait::async_trait;
use craft_config::{StoreBackend, StoreConfig};
use craft_core::{CombinationRecord, ElementPair, PairOrder};
use std::sync::Arc;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

/// Backend for combination records
#[async_trait]
pub trait CombinationStore: Send + Sync {
    /// Short backend name for health output
    fn backend(&self) -> &'static str;

    /// Every record whose `parentElements` match `pair` under `order`.
    async fn find_by_parents(
        &self,
        pair: &ElementPair,
        order: PairOrder,
    ) -> Result<Vec<CombinationRecord>>;

    /// Append a record. Existing records for the same pair are left alone.
    async fn insert(&self, record: &CombinationRecord) -> Result<()>;

    /// Number of stored records
    async fn count(&self) -> Result<u64>;

    /// Round-trip to the backend
    async fn ping(&self) -> Result<()>;
}

/// Open the store described by `config`.
pub async fn open(config: &StoreConfig) -> Result<Arc<dyn CombinationStore>> {
    match config.backend {
        StoreBackend::Mongodb => {
            let store = MongoStore::connect(config).await?;
            store.ensure_indexes().await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::info!("using in-memory combination store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
