//! # Craft Core
//!
//! Shared vocabulary for the Infinite Craft workspace: elements, combination
//! records, the wire response of the combine API and the built-in starter set.
//!
//! ```text
//!   Fire 🔥  +  Water 💧  ──►  Steam 💨
//!     │           │              │
//!     └─── ElementPair ──────────┴── CombinationRecord { parentElements }
//! ```

pub mod element;
pub mod pair;

pub use element::{initial_elements, CombinationRecord, CombineResponse, Element};
pub use pair::{ElementPair, PairOrder};

/// Result type for craft-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building core values
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Element name must not be empty")]
    EmptyName,

    #[error("Element {0:?} has no emoji")]
    EmptyEmoji(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
