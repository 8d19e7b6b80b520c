//! Named response store contracts and adapters.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
    future::Future,
    pin::Pin,
    rc::Rc,
};

use futures::future::join_all;

use crate::{
    http::{CacheRequest, CacheResponse},
    network::{Network, OfflineNetwork},
};

/// Object-safe boxed future used by [`NamedStore`] async methods.
pub type NamedStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Handle to one opened store, identified by its name.
pub struct StoreHandle {
    name: String,
}

impl StoreHandle {
    /// Creates a handle for the store called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Name the handle was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Which stores a lookup consults.
pub enum LookupScope<'a> {
    /// Every store the host knows about, in creation order. First match wins.
    AllStores,
    /// One opened store.
    Store(&'a StoreHandle),
}

/// Host collection of named request → response stores.
///
/// Each store is addressed by a string name. Single-key operations are atomic on the host side;
/// implementations add no locking of their own.
pub trait NamedStore {
    /// Opens the store called `name`, creating it when absent.
    fn open<'a>(&'a self, name: &'a str) -> NamedStoreFuture<'a, Result<StoreHandle, String>>;

    /// Fetches every key and stores the responses in `handle`.
    ///
    /// All-or-nothing: when any key fails to fetch or answers with a non-2xx status, nothing
    /// from this call is stored.
    fn populate<'a>(
        &'a self,
        handle: &'a StoreHandle,
        keys: &'a [String],
    ) -> NamedStoreFuture<'a, Result<(), String>>;

    /// Lists the names of every existing store.
    fn list_names<'a>(&'a self) -> NamedStoreFuture<'a, Result<Vec<String>, String>>;

    /// Deletes the store called `name` with all its entries. Returns `false` when it did not
    /// exist.
    fn delete<'a>(&'a self, name: &'a str) -> NamedStoreFuture<'a, Result<bool, String>>;

    /// Looks up a stored response for `request`.
    fn lookup<'a>(
        &'a self,
        scope: LookupScope<'a>,
        request: &'a CacheRequest,
    ) -> NamedStoreFuture<'a, Result<Option<CacheResponse>, String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op store for unsupported targets and baseline tests.
pub struct NoopNamedStore;

impl NamedStore for NoopNamedStore {
    fn open<'a>(&'a self, name: &'a str) -> NamedStoreFuture<'a, Result<StoreHandle, String>> {
        Box::pin(async move { Ok(StoreHandle::new(name)) })
    }

    fn populate<'a>(
        &'a self,
        _handle: &'a StoreHandle,
        _keys: &'a [String],
    ) -> NamedStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn list_names<'a>(&'a self) -> NamedStoreFuture<'a, Result<Vec<String>, String>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn delete<'a>(&'a self, _name: &'a str) -> NamedStoreFuture<'a, Result<bool, String>> {
        Box::pin(async { Ok(false) })
    }

    fn lookup<'a>(
        &'a self,
        _scope: LookupScope<'a>,
        _request: &'a CacheRequest,
    ) -> NamedStoreFuture<'a, Result<Option<CacheResponse>, String>> {
        Box::pin(async { Ok(None) })
    }
}

#[derive(Debug, Default)]
struct MemoryStores {
    order: Vec<String>,
    entries: HashMap<String, BTreeMap<String, CacheResponse>>,
    failing_deletes: HashSet<String>,
    lookup_failure: Option<String>,
}

#[derive(Clone)]
/// In-memory store collection that populates from an injected [`Network`] origin.
///
/// Clones share state.
pub struct MemoryNamedStore {
    inner: Rc<RefCell<MemoryStores>>,
    origin: Rc<dyn Network>,
}

impl Default for MemoryNamedStore {
    fn default() -> Self {
        Self::new(Rc::new(OfflineNetwork))
    }
}

impl fmt::Debug for MemoryNamedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryNamedStore")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl MemoryNamedStore {
    /// Creates an empty collection that populates from `origin`.
    pub fn new(origin: Rc<dyn Network>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryStores::default())),
            origin,
        }
    }

    /// Writes one entry directly, creating the store when absent.
    pub fn insert(&self, name: &str, url: impl Into<String>, response: CacheResponse) {
        let mut stores = self.inner.borrow_mut();
        stores.ensure(name).insert(url.into(), response);
    }

    /// Sorted entry keys of store `name`, or `None` when the store does not exist.
    pub fn entry_keys(&self, name: &str) -> Option<Vec<String>> {
        self.inner
            .borrow()
            .entries
            .get(name)
            .map(|entries| entries.keys().cloned().collect())
    }

    /// Makes deletion of store `name` fail.
    pub fn fail_delete(&self, name: impl Into<String>) {
        self.inner.borrow_mut().failing_deletes.insert(name.into());
    }

    /// Makes every lookup fail with `reason`.
    pub fn fail_lookups(&self, reason: impl Into<String>) {
        self.inner.borrow_mut().lookup_failure = Some(reason.into());
    }
}

impl MemoryStores {
    fn ensure(&mut self, name: &str) -> &mut BTreeMap<String, CacheResponse> {
        if !self.entries.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.entries.entry(name.to_string()).or_default()
    }
}

impl NamedStore for MemoryNamedStore {
    fn open<'a>(&'a self, name: &'a str) -> NamedStoreFuture<'a, Result<StoreHandle, String>> {
        Box::pin(async move {
            self.inner.borrow_mut().ensure(name);
            Ok(StoreHandle::new(name))
        })
    }

    fn populate<'a>(
        &'a self,
        handle: &'a StoreHandle,
        keys: &'a [String],
    ) -> NamedStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            let requests: Vec<CacheRequest> =
                keys.iter().map(|key| CacheRequest::get(key.as_str())).collect();
            let responses = join_all(requests.iter().map(|req| self.origin.fetch(req))).await;

            let mut staged = Vec::with_capacity(keys.len());
            for (request, response) in requests.iter().zip(responses) {
                let response =
                    response.map_err(|e| format!("failed to fetch {}: {e}", request.url))?;
                if !response.is_ok() {
                    return Err(format!(
                        "request for {} returned status {}",
                        request.url, response.status
                    ));
                }
                staged.push((request.url.clone(), response));
            }

            let mut stores = self.inner.borrow_mut();
            let entries = stores
                .entries
                .get_mut(handle.name())
                .ok_or_else(|| format!("store `{}` no longer exists", handle.name()))?;
            entries.extend(staged);
            Ok(())
        })
    }

    fn list_names<'a>(&'a self) -> NamedStoreFuture<'a, Result<Vec<String>, String>> {
        Box::pin(async move { Ok(self.inner.borrow().order.clone()) })
    }

    fn delete<'a>(&'a self, name: &'a str) -> NamedStoreFuture<'a, Result<bool, String>> {
        Box::pin(async move {
            let mut stores = self.inner.borrow_mut();
            if stores.failing_deletes.contains(name) {
                return Err(format!("failed to delete store `{name}`"));
            }
            stores.order.retain(|existing| existing != name);
            Ok(stores.entries.remove(name).is_some())
        })
    }

    fn lookup<'a>(
        &'a self,
        scope: LookupScope<'a>,
        request: &'a CacheRequest,
    ) -> NamedStoreFuture<'a, Result<Option<CacheResponse>, String>> {
        Box::pin(async move {
            if !request.is_cacheable_method() {
                return Ok(None);
            }
            let stores = self.inner.borrow();
            if let Some(reason) = &stores.lookup_failure {
                return Err(reason.clone());
            }
            let key = request.cache_key();
            let found = match scope {
                LookupScope::Store(handle) => stores
                    .entries
                    .get(handle.name())
                    .and_then(|entries| entries.get(key)),
                LookupScope::AllStores => stores
                    .order
                    .iter()
                    .filter_map(|name| stores.entries.get(name))
                    .find_map(|entries| entries.get(key)),
            };
            Ok(found.cloned())
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::network::MemoryNetwork;

    fn keys(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    fn origin_with(routes: &[&str]) -> MemoryNetwork {
        let network = MemoryNetwork::default();
        for route in routes {
            network.route(*route, CacheResponse::ok(format!("body of {route}")));
        }
        network
    }

    #[test]
    fn populate_stores_every_key_from_origin() {
        let origin = origin_with(&["/", "/static/icon.png"]);
        let store = MemoryNamedStore::new(Rc::new(origin));
        let store_obj: &dyn NamedStore = &store;

        let handle = block_on(store_obj.open("v1")).expect("open");
        block_on(store_obj.populate(&handle, &keys(&["/", "/static/icon.png"]))).expect("populate");

        assert_eq!(
            store.entry_keys("v1"),
            Some(keys(&["/", "/static/icon.png"]))
        );
        let cached = block_on(store_obj.lookup(
            LookupScope::Store(&handle),
            &CacheRequest::get("/static/icon.png"),
        ))
        .expect("lookup");
        assert_eq!(cached, Some(CacheResponse::ok("body of /static/icon.png")));
    }

    #[test]
    fn populate_is_all_or_nothing() {
        let origin = origin_with(&["/a", "/c"]);
        let store = MemoryNamedStore::new(Rc::new(origin.clone()));

        let handle = block_on(store.open("v1")).expect("open");
        let err = block_on(store.populate(&handle, &keys(&["/a", "/b", "/c"])))
            .expect_err("404 should fail populate");
        assert_eq!(err, "request for /b returned status 404");
        assert_eq!(store.entry_keys("v1"), Some(Vec::new()));

        origin.route("/b", CacheResponse::ok("b")).fail("/c");
        let err = block_on(store.populate(&handle, &keys(&["/a", "/b", "/c"])))
            .expect_err("network failure should fail populate");
        assert_eq!(err, "failed to fetch /c: network unavailable for /c");
        assert_eq!(store.entry_keys("v1"), Some(Vec::new()));
    }

    #[test]
    fn populate_into_deleted_store_fails() {
        let store = MemoryNamedStore::new(Rc::new(origin_with(&["/"])));
        let handle = block_on(store.open("v1")).expect("open");
        assert!(block_on(store.delete("v1")).expect("delete"));

        let err = block_on(store.populate(&handle, &keys(&["/"]))).expect_err("orphan populate");
        assert_eq!(err, "store `v1` no longer exists");
    }

    #[test]
    fn list_and_delete_follow_creation_order() {
        let store = MemoryNamedStore::default();
        for name in ["v2", "v1", "v3"] {
            block_on(store.open(name)).expect("open");
        }
        block_on(store.open("v1")).expect("reopen keeps position");

        assert_eq!(block_on(store.list_names()).expect("list"), keys(&["v2", "v1", "v3"]));
        assert!(block_on(store.delete("v1")).expect("delete v1"));
        assert!(!block_on(store.delete("v1")).expect("delete v1 again"));
        assert_eq!(block_on(store.list_names()).expect("list"), keys(&["v2", "v3"]));

        store.fail_delete("v3");
        assert!(block_on(store.delete("v3")).is_err());
        assert_eq!(block_on(store.list_names()).expect("list"), keys(&["v2", "v3"]));
    }

    #[test]
    fn lookup_across_all_stores_returns_first_match() {
        let store = MemoryNamedStore::default();
        store.insert("old", "/", CacheResponse::ok("old"));
        store.insert("new", "/", CacheResponse::ok("new"));
        store.insert("new", "/only-new", CacheResponse::ok("only-new"));

        let first = block_on(store.lookup(LookupScope::AllStores, &CacheRequest::get("/")))
            .expect("lookup");
        assert_eq!(first, Some(CacheResponse::ok("old")));

        let only_new =
            block_on(store.lookup(LookupScope::AllStores, &CacheRequest::get("/only-new")))
                .expect("lookup");
        assert_eq!(only_new, Some(CacheResponse::ok("only-new")));

        let missing = block_on(store.lookup(LookupScope::AllStores, &CacheRequest::get("/nope")))
            .expect("lookup");
        assert_eq!(missing, None);
    }

    #[test]
    fn lookup_ignores_non_get_requests() {
        let store = MemoryNamedStore::default();
        store.insert("v1", "/api", CacheResponse::ok("cached"));
        let post = CacheRequest::new("POST", "/api");

        assert_eq!(
            block_on(store.lookup(LookupScope::AllStores, &post)).expect("lookup"),
            None
        );
    }

    #[test]
    fn failing_lookups_report_the_reason() {
        let store = MemoryNamedStore::default();
        store.insert("v1", "/", CacheResponse::ok("cached"));
        store.fail_lookups("cache storage is gone");

        let err = block_on(store.lookup(LookupScope::AllStores, &CacheRequest::get("/")))
            .expect_err("lookup should fail");
        assert_eq!(err, "cache storage is gone");
    }

    #[test]
    fn noop_named_store_is_empty_and_successful() {
        let store = NoopNamedStore;
        let store_obj: &dyn NamedStore = &store;
        let handle = block_on(store_obj.open("v1")).expect("open");
        assert_eq!(handle.name(), "v1");
        block_on(store_obj.populate(&handle, &keys(&["/"]))).expect("populate");
        assert_eq!(block_on(store_obj.list_names()).expect("list"), Vec::<String>::new());
        assert!(!block_on(store_obj.delete("v1")).expect("delete"));
        assert_eq!(
            block_on(store_obj.lookup(LookupScope::AllStores, &CacheRequest::get("/")))
                .expect("lookup"),
            None
        );
    }
}
