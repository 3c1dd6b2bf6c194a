//! MongoDB backend

use async_trait::async_trait;
use bson::{doc, Document};
use craft_config::StoreConfig;
use craft_core::{CombinationRecord, ElementPair, PairOrder};
use futures::TryStreamExt;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};

use crate::{CombinationStore, Result};

const APP_NAME: &str = "infinite-craft";

pub struct MongoStore {
    db: Database,
    records: Collection<CombinationRecord>,
}

impl MongoStore {
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        if options.app_name.is_none() {
            options.app_name = Some(APP_NAME.to_string());
        }
        let client = Client::with_options(options)?;
        let db = client.database(&config.database);
        let records = db.collection::<CombinationRecord>(&config.collection);

        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "connected to MongoDB"
        );
        Ok(Self { db, records })
    }

    /// Non-unique index on the parent pair; duplicates are tolerated.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "parentElements": 1 })
            .options(
                IndexOptions::builder()
                    .name("parent_elements".to_string())
                    .build(),
            )
            .build();
        self.records.create_index(index).await?;
        Ok(())
    }
}

/// Filter matching stored parents against `pair`.
pub fn parents_filter(pair: &ElementPair, order: PairOrder) -> Document {
    let exact = doc! { "parentElements": [pair.first(), pair.second()] };
    match order {
        PairOrder::Ordered => exact,
        PairOrder::Unordered => doc! {
            "$or": [
                exact,
                { "parentElements": [pair.second(), pair.first()] },
            ]
        },
    }
}

#[async_trait]
impl CombinationStore for MongoStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn find_by_parents(
        &self,
        pair: &ElementPair,
        order: PairOrder,
    ) -> Result<Vec<CombinationRecord>> {
        let cursor = self.records.find(parents_filter(pair, order)).await?;
        let records: Vec<CombinationRecord> = cursor.try_collect().await?;
        Ok(records)
    }

    async fn insert(&self, record: &CombinationRecord) -> Result<()> {
        let result = self.records.insert_one(record).await?;
        tracing::debug!(id = %result.inserted_id, name = %record.name, "inserted record");
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.count_documents(doc! {}).await?)
    }

    async fn ping(&self) -> Result<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
