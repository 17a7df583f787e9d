//! Client core for the Luméra live-class marketplace
//!
//! Framework-agnostic: REST clients, persisted session, session controller
//! and the list reducers pages use. The Leptos layer in `crate::ui` only
//! mirrors this state into signals.

pub mod api;
pub mod async_op;
pub mod auth;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod listing;
pub mod recent_searches;
pub mod storage;

pub use async_op::{AsyncState, optional, run_tracked};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ClientConfig;
pub use dashboard::{EducatorDashboard, load_educator_dashboard};
pub use recent_searches::RecentSearches;
pub use storage::{BrowserStorage, KeyValueStore, MemoryStore, StorageError};
#[cfg(feature = "ssr")]
pub use storage::FileStore;
