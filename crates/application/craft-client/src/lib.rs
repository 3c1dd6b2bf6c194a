//! # Craft Client
//!
//! Everything a front end needs besides drawing: the game state, the rules
//! for pairing cards, local persistence of discoveries and the call to the
//! combine API.
//!
//! ```text
//!   UI event ──► Action ──► CraftState::apply ──► [Effect]
//!                                                   │
//!             ┌──────────────┬──────────────────────┼──────────────┐
//!             ▼              ▼                      ▼              ▼
//!      RequestCombine     Persist          ScheduleExpireNew  ScheduleDismissError
//!       (CombineClient)  (LocalStorage)         (timer)            (timer)
//!             │                                     │              │
//!             └── CombineSucceeded / Failed ◄───────┴── Action ◄───┘
//! ```

pub mod api;
pub mod controller;
pub mod state;
pub mod storage;

pub use api::{CombineClient, HttpCombineClient, LocalCombineClient};
pub use controller::Controller;
pub use state::{Action, CraftState, Effect, KnownElement, Settings, SortMode};
pub use storage::{
    load_elements, save_elements, FileStorage, LocalStorage, MemoryStorage, ELEMENTS_KEY,
};

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Combine API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Resolve(#[from] craft_resolver::ResolveError),

    #[error("Storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Corrupt local storage: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Invalid saved elements: {0}")]
    Elements(#[from] craft_core::Error),
}
