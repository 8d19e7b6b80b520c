//! Named-store adapters backed by browser storage.

pub mod cache_storage;
