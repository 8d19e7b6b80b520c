//! `fetch`-backed network adapter.

use offline_host::{CacheRequest, CacheResponse, Network, NetworkFuture};

#[derive(Debug, Clone, Copy, Default)]
/// Browser network access through the global `fetch`.
pub struct WebNetwork;

impl Network for WebNetwork {
    fn fetch<'a>(
        &'a self,
        request: &'a CacheRequest,
    ) -> NetworkFuture<'a, Result<CacheResponse, String>> {
        Box::pin(async move { crate::bridge::network_fetch(request).await })
    }
}
