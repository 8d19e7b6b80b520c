//! Offline cache policy for the page's service worker.
//!
//! [`OfflineCacheAgent`] owns three decisions and nothing else: which generation is current,
//! which assets populate it, and when older generations go away. Storage and network access are
//! injected through the [`offline_host`] capability traits so the same policy runs against the
//! browser Cache Storage API and against the in-memory adapters used in tests.
//!
//! - `install` pre-caches the manifest into the current generation, all or nothing.
//! - `activate` deletes every other generation, best effort.
//! - `fetch` is network-first with a cache fallback and never writes back.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod agent;
pub mod config;
mod dispatch;
mod error;
mod report;

pub use agent::OfflineCacheAgent;
pub use config::{
    AssetManifest, CacheGeneration, OfflineCacheConfig, ASSET_MANIFEST, CACHE_GENERATION,
};
pub use dispatch::{EventKind, HandlerOutcome, LifecycleEvent};
pub use error::{ActivateError, AgentError, ConfigError, InstallError};
pub use report::{ActivateReport, DeleteFailure, FetchOutcome, InstallReport};
