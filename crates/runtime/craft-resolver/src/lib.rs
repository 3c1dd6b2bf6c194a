//! # Craft Resolver
//!
//! Turns two element names into a result element.
//!
//! ```text
//!   (first, second)
//!         │
//!         ▼
//!   store.find_by_parents ──hit──► random pick ──► { new: false }
//!         │ miss
//!         ▼
//!   per-pair gate ──► re-check store ──hit──► { new: false }
//!         │ miss
//!         ▼
//!   prompt ──► generator ──► strip fences ──► parse JSON
//!         │
//!         ▼
//!   store.insert ──► { new: true }
//! ```
//!
//! The gate only serializes misses inside one process. Two servers sharing a
//! database can still both miss and both write.

pub mod flight;
pub mod prompt;
pub mod response;

pub use prompt::build_prompt;
pub use response::{parse_generated, strip_fences};

use craft_core::{CombinationRecord, CombineResponse, Element, ElementPair, PairOrder};
use craft_llm::{GenerationError, Generator};
use craft_mongodb::{CombinationStore, StoreError};
use rand::seq::SliceRandom;
use std::sync::Arc;

use flight::FlightTable;

pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Missing {0}")]
    MissingElement(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Generator returned invalid JSON: {source}")]
    MalformedResponse {
        raw: String,
        source: serde_json::Error,
    },

    #[error("Incomplete response from generator: {0}")]
    IncompleteResponse(String),
}

impl ResolveError {
    /// True when the caller sent a bad request rather than the server failing.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingElement(_))
    }
}

/// Outcome of one resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub element: Element,
    /// Whether this call created the record
    pub new: bool,
}

impl From<Resolution> for CombineResponse {
    fn from(resolution: Resolution) -> Self {
        CombineResponse::new(resolution.element, resolution.new)
    }
}

pub struct Resolver {
    store: Arc<dyn CombinationStore>,
    generator: Arc<dyn Generator>,
    order: PairOrder,
    flights: FlightTable,
}

impl Resolver {
    pub fn new(store: Arc<dyn CombinationStore>, generator: Arc<dyn Generator>) -> Self {
        Self {
            store,
            generator,
            order: PairOrder::default(),
            flights: FlightTable::new(),
        }
    }

    /// Set how stored parent pairs are matched
    pub fn pair_order(mut self, order: PairOrder) -> Self {
        self.order = order;
        self
    }

    pub fn order(&self) -> PairOrder {
        self.order
    }

    pub fn store(&self) -> &Arc<dyn CombinationStore> {
        &self.store
    }

    pub fn generator(&self) -> &Arc<dyn Generator> {
        &self.generator
    }

    /// Pairs currently being generated
    pub fn in_flight(&self) -> usize {
        self.flights.active()
    }

    /// Resolve `first + second`, generating and storing a result on a miss.
    pub async fn resolve(&self, first: &str, second: &str) -> Result<Resolution> {
        let pair = validate(first, second)?;

        if let Some(element) = self.lookup(&pair).await? {
            return Ok(Resolution { element, new: false });
        }

        let gate = self.flights.gate(pair.key(self.order));
        let _turn = gate.lock().await;

        // Someone holding the gate before us may have just stored it.
        if let Some(element) = self.lookup(&pair).await? {
            return Ok(Resolution { element, new: false });
        }

        tracing::info!(pair = %pair, "cache miss, generating");
        let element = self.generate(&pair).await?;
        let record = CombinationRecord::new(element.clone(), &pair);
        self.store.insert(&record).await?;
        tracing::info!(pair = %pair, result = %element, "stored new combination");

        Ok(Resolution { element, new: true })
    }

    async fn lookup(&self, pair: &ElementPair) -> Result<Option<Element>> {
        let records = self.store.find_by_parents(pair, self.order).await?;
        let count = records.len();
        let picked = pick(records);
        if let Some(element) = &picked {
            tracing::info!(pair = %pair, matches = count, result = %element, "cache hit");
        }
        Ok(picked)
    }

    async fn generate(&self, pair: &ElementPair) -> Result<Element> {
        let prompt = build_prompt(pair);
        let raw = self.generator.generate(&prompt).await?;
        tracing::debug!(pair = %pair, generator = self.generator.name(), raw = %raw, "raw generator output");

        parse_generated(&raw).map_err(|e| {
            tracing::error!(pair = %pair, error = %e, "unusable generator output");
            e
        })
    }
}

fn validate(first: &str, second: &str) -> Result<ElementPair> {
    if first.trim().is_empty() {
        return Err(ResolveError::MissingElement("element1"));
    }
    if second.trim().is_empty() {
        return Err(ResolveError::MissingElement("element2"));
    }
    Ok(ElementPair::new(first, second))
}

/// Uniform choice among duplicate records for one pair.
fn pick(records: Vec<CombinationRecord>) -> Option<Element> {
    records
        .choose(&mut rand::thread_rng())
        .map(CombinationRecord::element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use craft_mongodb::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Replies with a fixed text and counts calls.
    struct ScriptedGenerator {
        reply: String,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }

        fn slow(reply: &str, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                delay,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "test"
        }

        async fn generate(&self, _prompt: &str) -> craft_llm::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(self.reply.clone())
        }
    }

    const STEAM: &str = r#"{"new_element":"Steam","emoji":"💨"}"#;

    fn setup(reply: &str) -> (Arc<MemoryStore>, Arc<ScriptedGenerator>, Resolver) {
        let store = Arc::new(MemoryStore::new());
        let generator = ScriptedGenerator::new(reply);
        let resolver = Resolver::new(store.clone(), generator.clone());
        (store, generator, resolver)
    }

    #[tokio::test]
    async fn test_miss_generates_and_stores() {
        let (store, generator, resolver) = setup(STEAM);

        let resolution = resolver.resolve("Fire", "Water").await.unwrap();
        assert_eq!(resolution.element, Element::new("Steam", "💨"));
        assert!(resolution.new);
        assert_eq!(generator.calls(), 1);

        let records = store.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].parent_elements, ["Fire".to_string(), "Water".to_string()]);

        let response: CombineResponse = resolution.into();
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            serde_json::json!({ "name": "Steam", "emoji": "💨", "new": true })
        );
    }

    #[tokio::test]
    async fn test_hit_skips_generator() {
        let (store, generator, resolver) = setup(STEAM);

        resolver.resolve("Fire", "Water").await.unwrap();
        let again = resolver.resolve("Fire", "Water").await.unwrap();

        assert!(!again.new);
        assert_eq!(again.element.name, "Steam");
        assert_eq!(generator.calls(), 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_existing_record_is_never_regenerated() {
        let store = Arc::new(MemoryStore::with_records(vec![CombinationRecord::new(
            Element::new("Lava", "🌋"),
            &ElementPair::new("Fire", "Earth"),
        )]));
        let generator = ScriptedGenerator::new("not json at all");
        let resolver = Resolver::new(store, generator.clone());

        let resolution = resolver.resolve("Fire", "Earth").await.unwrap();
        assert_eq!(resolution.element.name, "Lava");
        assert!(!resolution.new);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_swapped_order_hits_when_unordered() {
        let (_, generator, resolver) = setup(STEAM);

        resolver.resolve("Fire", "Water").await.unwrap();
        let swapped = resolver.resolve("Water", "Fire").await.unwrap();
        assert!(!swapped.new);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_swapped_order_misses_when_ordered() {
        let store = Arc::new(MemoryStore::new());
        let generator = ScriptedGenerator::new(STEAM);
        let resolver =
            Resolver::new(store.clone(), generator.clone()).pair_order(PairOrder::Ordered);

        resolver.resolve("Fire", "Water").await.unwrap();
        let swapped = resolver.resolve("Water", "Fire").await.unwrap();
        assert!(swapped.new);
        assert_eq!(generator.calls(), 2);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicates_pick_one_of_them() {
        let pair = ElementPair::new("Fire", "Water");
        let store = Arc::new(MemoryStore::with_records(vec![
            CombinationRecord::new(Element::new("Steam", "💨"), &pair),
            CombinationRecord::new(Element::new("Vapor", "🌫️"), &pair),
        ]));
        let resolver = Resolver::new(store, ScriptedGenerator::new(STEAM));

        for _ in 0..10 {
            let resolution = resolver.resolve("Fire", "Water").await.unwrap();
            assert!(!resolution.new);
            assert!(["Steam", "Vapor"].contains(&resolution.element.name.as_str()));
        }
    }

    #[tokio::test]
    async fn test_fenced_reply() {
        let (_, _, resolver) = setup("```json\n{\"new_element\":\"Mud\",\"emoji\":\"💦\"}\n```");
        let resolution = resolver.resolve("Earth", "Water").await.unwrap();
        assert_eq!(resolution.element, Element::new("Mud", "💦"));
    }

    #[tokio::test]
    async fn test_incomplete_reply_stores_nothing() {
        let (store, _, resolver) = setup(r#"{"new_element":"Steam"}"#);
        let err = resolver.resolve("Fire", "Water").await.unwrap_err();
        assert!(matches!(err, ResolveError::IncompleteResponse(_)));
        assert!(!err.is_client_error());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_malformed_reply() {
        let (_, _, resolver) = setup("Steam, obviously");
        let err = resolver.resolve("Fire", "Water").await.unwrap_err();
        assert!(matches!(err, ResolveError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_missing_element() {
        let (_, generator, resolver) = setup(STEAM);
        let err = resolver.resolve("", "Water").await.unwrap_err();
        assert!(matches!(err, ResolveError::MissingElement("element1")));
        assert!(err.is_client_error());

        let err = resolver.resolve("Fire", "  ").await.unwrap_err();
        assert!(matches!(err, ResolveError::MissingElement("element2")));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_misses_generate_once() {
        let store = Arc::new(MemoryStore::new());
        let generator = ScriptedGenerator::slow(STEAM, Duration::from_millis(50));
        let resolver = Resolver::new(store.clone(), generator.clone());

        let (a, b) = tokio::join!(
            resolver.resolve("Fire", "Water"),
            resolver.resolve("Water", "Fire")
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(generator.calls(), 1);
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(a.new ^ b.new);
        assert_eq!(a.element, b.element);
        assert_eq!(resolver.in_flight(), 0);
    }
}
