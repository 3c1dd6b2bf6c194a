//! In-process backend for tests and offline play

use async_trait::async_trait;
use craft_core::{CombinationRecord, ElementPair, PairOrder};
use tokio::sync::RwLock;

use crate::{CombinationStore, Result};

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<CombinationRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<CombinationRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Snapshot of every stored record in insertion order
    pub async fn records(&self) -> Vec<CombinationRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl CombinationStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_by_parents(
        &self,
        pair: &ElementPair,
        order: PairOrder,
    ) -> Result<Vec<CombinationRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| pair.matches(&r.parent_elements, order))
            .cloned()
            .collect())
    }

    async fn insert(&self, record: &CombinationRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.read().await.len() as u64)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
