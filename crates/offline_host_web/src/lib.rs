//! Browser (`wasm32`) implementations of [`offline_host`] capability contracts.
//!
//! [`WebNamedStore`] binds the Cache Storage API and [`WebNetwork`] binds the global `fetch`.
//! Both route through one inline-JS bridge; on other targets the bridge degrades to an empty,
//! offline host so the adapters stay testable natively.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod bridge;
pub mod network;
pub mod store;

pub use network::WebNetwork;
pub use store::cache_storage::WebNamedStore;

/// Conversions between host `Request`/`Response` objects and [`offline_host`] descriptors.
#[cfg(target_arch = "wasm32")]
pub mod worker {
    pub use crate::bridge::{build_response, describe_request};
}
