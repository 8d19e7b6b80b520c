//! Network capability contracts and test adapters.

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    future::Future,
    pin::Pin,
    rc::Rc,
};

use crate::http::{CacheRequest, CacheResponse};

/// Object-safe boxed future used by [`Network`] async methods.
pub type NetworkFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host network access used for runtime fetches and for populating stores.
pub trait Network {
    /// Sends `request` unmodified.
    ///
    /// An `Err` means the request never produced a response (typically no connectivity). HTTP
    /// error statuses are still `Ok`.
    fn fetch<'a>(&'a self, request: &'a CacheRequest)
        -> NetworkFuture<'a, Result<CacheResponse, String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Network adapter with no connectivity. Every fetch fails.
pub struct OfflineNetwork;

impl Network for OfflineNetwork {
    fn fetch<'a>(
        &'a self,
        request: &'a CacheRequest,
    ) -> NetworkFuture<'a, Result<CacheResponse, String>> {
        Box::pin(async move { Err(format!("network unavailable for {}", request.url)) })
    }
}

#[derive(Debug, Default)]
struct MemoryNetworkState {
    routes: HashMap<String, CacheResponse>,
    failing: HashSet<String>,
    offline: bool,
    requests: Vec<String>,
}

#[derive(Debug, Clone, Default)]
/// Scripted in-memory origin.
///
/// Clones share state, so a test can keep one handle to flip connectivity while the agent owns
/// another. Unrouted URLs answer `404 Not Found`.
pub struct MemoryNetwork {
    inner: Rc<RefCell<MemoryNetworkState>>,
}

impl MemoryNetwork {
    /// Serves `response` for `url`.
    pub fn route(&self, url: impl Into<String>, response: CacheResponse) -> &Self {
        self.inner.borrow_mut().routes.insert(url.into(), response);
        self
    }

    /// Makes fetches of `url` fail as if the connection dropped.
    pub fn fail(&self, url: impl Into<String>) -> &Self {
        self.inner.borrow_mut().failing.insert(url.into());
        self
    }

    /// Toggles connectivity for every URL.
    pub fn set_offline(&self, offline: bool) {
        self.inner.borrow_mut().offline = offline;
    }

    /// URLs fetched so far, in call order. Failed attempts are included.
    pub fn requests(&self) -> Vec<String> {
        self.inner.borrow().requests.clone()
    }
}

impl Network for MemoryNetwork {
    fn fetch<'a>(
        &'a self,
        request: &'a CacheRequest,
    ) -> NetworkFuture<'a, Result<CacheResponse, String>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            state.requests.push(request.url.clone());
            if state.offline || state.failing.contains(&request.url) {
                return Err(format!("network unavailable for {}", request.url));
            }
            Ok(state
                .routes
                .get(&request.url)
                .cloned()
                .unwrap_or_else(|| CacheResponse::with_status(404, "Not Found", Vec::new())))
        })
    }
}
