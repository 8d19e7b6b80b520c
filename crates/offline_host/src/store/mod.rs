//! Named-store contracts and lightweight test adapters.

mod named_store;

pub use named_store::{
    LookupScope, MemoryNamedStore, NamedStore, NamedStoreFuture, NoopNamedStore, StoreHandle,
};
