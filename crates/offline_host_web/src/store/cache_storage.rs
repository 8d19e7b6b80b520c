//! Cache Storage API-backed named store.

use offline_host::{
    CacheRequest, CacheResponse, LookupScope, NamedStore, NamedStoreFuture, StoreHandle,
};

#[derive(Debug, Clone, Copy, Default)]
/// Browser named store backed by `caches`.
pub struct WebNamedStore;

impl NamedStore for WebNamedStore {
    fn open<'a>(&'a self, name: &'a str) -> NamedStoreFuture<'a, Result<StoreHandle, String>> {
        Box::pin(async move {
            crate::bridge::store_open(name).await?;
            Ok(StoreHandle::new(name))
        })
    }

    fn populate<'a>(
        &'a self,
        handle: &'a StoreHandle,
        keys: &'a [String],
    ) -> NamedStoreFuture<'a, Result<(), String>> {
        Box::pin(async move { crate::bridge::store_populate(handle.name(), keys).await })
    }

    fn list_names<'a>(&'a self) -> NamedStoreFuture<'a, Result<Vec<String>, String>> {
        Box::pin(async move { crate::bridge::store_names().await })
    }

    fn delete<'a>(&'a self, name: &'a str) -> NamedStoreFuture<'a, Result<bool, String>> {
        Box::pin(async move { crate::bridge::store_delete(name).await })
    }

    fn lookup<'a>(
        &'a self,
        scope: LookupScope<'a>,
        request: &'a CacheRequest,
    ) -> NamedStoreFuture<'a, Result<Option<CacheResponse>, String>> {
        Box::pin(async move {
            let name = match scope {
                LookupScope::AllStores => None,
                LookupScope::Store(handle) => Some(handle.name()),
            };
            crate::bridge::store_lookup(name, request).await
        })
    }
}
