//! Typed host-domain contracts for the offline cache worker.
//!
//! This crate is the API-first boundary between the caching policy and whatever hosts it. It
//! exposes the request/response models plus the [`NamedStore`] and [`Network`] capability
//! traits, while concrete browser adapters live in `offline_host_web`. The in-memory adapters
//! here back the policy tests.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod http;
pub mod network;
pub mod store;

pub use http::{CacheRequest, CacheResponse, HeaderList, HostObject};
pub use network::{MemoryNetwork, Network, NetworkFuture, OfflineNetwork};
pub use store::{
    LookupScope, MemoryNamedStore, NamedStore, NamedStoreFuture, NoopNamedStore, StoreHandle,
};
