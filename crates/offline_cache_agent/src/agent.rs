use std::rc::Rc;

use futures::future::join_all;
use leptos::logging;
use offline_host::{CacheRequest, LookupScope, NamedStore, Network};

use crate::{
    config::OfflineCacheConfig,
    error::{ActivateError, InstallError},
    report::{ActivateReport, DeleteFailure, FetchOutcome, InstallReport},
};

/// Applies the offline caching policy to host lifecycle and fetch events.
///
/// The agent is stateless between events. Everything it knows lives in its
/// [`OfflineCacheConfig`]; everything it stores lives in the injected [`NamedStore`].
#[derive(Clone)]
pub struct OfflineCacheAgent {
    config: OfflineCacheConfig,
    store: Rc<dyn NamedStore>,
    network: Rc<dyn Network>,
}

impl OfflineCacheAgent {
    /// Creates an agent over the given store and network capabilities.
    pub fn new(
        config: OfflineCacheConfig,
        store: Rc<dyn NamedStore>,
        network: Rc<dyn Network>,
    ) -> Self {
        Self {
            config,
            store,
            network,
        }
    }

    /// Returns the generation and manifest this agent enforces.
    pub fn config(&self) -> &OfflineCacheConfig {
        &self.config
    }

    /// Opens the current generation and pre-caches every manifest entry into it.
    ///
    /// The host keeps the worker in its installing state until this settles.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Open`] when the store cannot be opened and
    /// [`InstallError::Populate`] when any single entry fails. Populate is all-or-nothing, so a
    /// failed install leaves no entries that count as ready.
    pub async fn install(&self) -> Result<InstallReport, InstallError> {
        let generation = self.config.generation().as_str();
        let handle = self
            .store
            .open(generation)
            .await
            .map_err(|reason| InstallError::Open {
                generation: generation.to_string(),
                reason,
            })?;
        logging::log!("cache `{generation}` opened");

        let manifest = self.config.manifest().as_slice();
        self.store
            .populate(&handle, manifest)
            .await
            .map_err(|reason| InstallError::Populate {
                generation: generation.to_string(),
                reason,
            })?;

        Ok(InstallReport {
            generation: generation.to_string(),
            cached: manifest.to_vec(),
        })
    }

    /// Deletes every generation other than the current one.
    ///
    /// Deletions run concurrently and all of them settle before this returns. A failed deletion
    /// does not stop the others; it is logged and listed in [`ActivateReport::failed`].
    ///
    /// # Errors
    ///
    /// Returns [`ActivateError::ListNames`] when existing generations cannot be enumerated.
    pub async fn activate(&self) -> Result<ActivateReport, ActivateError> {
        let current = self.config.generation().as_str();
        let names = self
            .store
            .list_names()
            .await
            .map_err(ActivateError::ListNames)?;
        let stale: Vec<&str> = names
            .iter()
            .map(String::as_str)
            .filter(|name| *name != current)
            .collect();

        let results = join_all(stale.iter().map(|name| self.store.delete(name))).await;

        let mut report = ActivateReport {
            current: current.to_string(),
            ..ActivateReport::default()
        };
        for (name, result) in stale.into_iter().zip(results) {
            match result {
                Ok(true) => report.deleted.push(name.to_string()),
                // Already gone, e.g. removed by another client between list and delete.
                Ok(false) => {}
                Err(reason) => {
                    logging::warn!("failed to delete stale cache `{name}`: {reason}");
                    report.failed.push(DeleteFailure {
                        name: name.to_string(),
                        reason,
                    });
                }
            }
        }
        Ok(report)
    }

    /// Answers an intercepted request: network first, stored copy on network failure.
    ///
    /// Network responses are never written back, so runtime traffic leaves every store
    /// untouched.
    pub async fn fetch(&self, request: &CacheRequest) -> FetchOutcome {
        if let Ok(response) = self.network.fetch(request).await {
            return FetchOutcome::Network(response);
        }

        // A failed lookup is a miss; the host reports the generic network error.
        match self.store.lookup(LookupScope::AllStores, request).await {
            Ok(Some(response)) => FetchOutcome::Cache(response),
            Ok(None) | Err(_) => FetchOutcome::NoResponse,
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use offline_host::{
        CacheResponse, HostObject, MemoryNamedStore, MemoryNetwork, NoopNamedStore,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::{AssetManifest, CacheGeneration};

    fn config(generation: &str, assets: &[&str]) -> OfflineCacheConfig {
        OfflineCacheConfig::new(
            CacheGeneration::new(generation).expect("generation"),
            AssetManifest::new(assets.iter().copied()).expect("manifest"),
        )
    }

    #[test]
    fn install_reports_manifest_in_order() {
        let network = MemoryNetwork::default();
        network
            .route("/b", CacheResponse::ok("b"))
            .route("/a", CacheResponse::ok("a"));
        let store = MemoryNamedStore::new(Rc::new(network.clone()));
        let agent = OfflineCacheAgent::new(
            config("v1", &["/b", "/a"]),
            Rc::new(store.clone()),
            Rc::new(network),
        );

        let report = block_on(agent.install()).expect("install");
        assert_eq!(
            report,
            InstallReport {
                generation: "v1".to_string(),
                cached: vec!["/b".to_string(), "/a".to_string()],
            }
        );
        assert_eq!(
            store.entry_keys("v1"),
            Some(vec!["/a".to_string(), "/b".to_string()])
        );
    }

    #[test]
    fn install_with_empty_manifest_still_creates_generation() {
        let store = MemoryNamedStore::default();
        let agent = OfflineCacheAgent::new(
            config("v1", &[]),
            Rc::new(store.clone()),
            Rc::new(MemoryNetwork::default()),
        );

        block_on(agent.install()).expect("install");
        assert_eq!(store.entry_keys("v1"), Some(Vec::new()));
    }

    #[test]
    fn install_failure_names_generation_and_cause() {
        let network = MemoryNetwork::default();
        network.set_offline(true);
        let agent = OfflineCacheAgent::new(
            config("v1", &["/"]),
            Rc::new(MemoryNamedStore::new(Rc::new(network.clone()))),
            Rc::new(network),
        );

        let err = block_on(agent.install()).expect_err("offline install should fail");
        assert_eq!(
            err.to_string(),
            "failed to pre-cache assets into `v1`: failed to fetch /: network unavailable for /"
        );
    }

    #[test]
    fn activate_on_fresh_host_is_a_clean_no_op() {
        let agent = OfflineCacheAgent::new(
            config("v1", &[]),
            Rc::new(NoopNamedStore),
            Rc::new(MemoryNetwork::default()),
        );

        let report = block_on(agent.activate()).expect("activate");
        assert_eq!(
            report,
            ActivateReport {
                current: "v1".to_string(),
                ..ActivateReport::default()
            }
        );
        assert!(report.is_clean());
    }

    #[test]
    fn fetch_returns_error_statuses_from_network_verbatim() {
        let network = MemoryNetwork::default();
        let store = MemoryNamedStore::default();
        store.insert("v1", "/missing", CacheResponse::ok("stale copy"));
        let agent = OfflineCacheAgent::new(config("v1", &[]), Rc::new(store), Rc::new(network));

        let outcome = block_on(agent.fetch(&CacheRequest::get("/missing")));
        assert_eq!(
            outcome,
            FetchOutcome::Network(CacheResponse::with_status(404, "Not Found", Vec::new()))
        );
    }

    #[test]
    fn fetch_hands_back_opaque_host_response_unchanged() {
        let cdn_response = HostObject::new("opaque response");
        let opaque = CacheResponse::with_status(0, "", Vec::new()).with_host(cdn_response.clone());
        let network = MemoryNetwork::default();
        network.route("https://cdn.example/x.png", opaque.clone());
        let agent = OfflineCacheAgent::new(
            config("v1", &[]),
            Rc::new(MemoryNamedStore::default()),
            Rc::new(network),
        );
        let request =
            CacheRequest::get("https://cdn.example/x.png").with_host(HostObject::new("no-cors"));

        let outcome = block_on(agent.fetch(&request));
        assert_eq!(outcome, FetchOutcome::Network(opaque));
        assert_eq!(
            outcome.response().and_then(CacheResponse::host),
            Some(&cdn_response)
        );
    }

    #[test]
    fn fetch_treats_failed_lookup_as_no_response() {
        let network = MemoryNetwork::default();
        network.set_offline(true);
        let store = MemoryNamedStore::default();
        store.insert("v1", "/", CacheResponse::ok("cached"));
        store.fail_lookups("cache storage is gone");
        let agent = OfflineCacheAgent::new(config("v1", &[]), Rc::new(store), Rc::new(network));

        let outcome = block_on(agent.fetch(&CacheRequest::get("/")));
        assert!(outcome.is_no_response());
    }
}
