//! Service-worker entrypoint for the offline cache agent.
//!
//! `static/service-worker.js` attaches the host listeners and forwards every event to the
//! exported `dispatch` function, which routes it through [`OfflineCacheAgent::dispatch`] with
//! the browser adapters from `offline_host_web`.

use std::rc::Rc;

use offline_cache_agent::{ConfigError, OfflineCacheAgent, OfflineCacheConfig};
use offline_host_web::{WebNamedStore, WebNetwork};

#[cfg(target_arch = "wasm32")]
mod worker;

/// Builds the agent from the built-in configuration over browser storage and network.
///
/// # Errors
///
/// Returns a [`ConfigError`] when the built-in configuration does not validate.
pub fn build_agent() -> Result<OfflineCacheAgent, ConfigError> {
    Ok(OfflineCacheAgent::new(
        OfflineCacheConfig::built_in()?,
        Rc::new(WebNamedStore),
        Rc::new(WebNetwork),
    ))
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use offline_cache_agent::{FetchOutcome, CACHE_GENERATION};
    use offline_host::CacheRequest;
    use pretty_assertions::assert_eq;

    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn non_wasm_agent_uses_built_in_generation_and_offline_host() {
        let agent = build_agent().expect("built-in agent");
        assert_eq!(agent.config().generation().as_str(), CACHE_GENERATION);

        let report = block_on(agent.activate()).expect("activate");
        assert!(report.deleted.is_empty());
        assert!(report.is_clean());

        assert!(block_on(agent.install()).is_err());
        assert_eq!(
            block_on(agent.fetch(&CacheRequest::get("/"))),
            FetchOutcome::NoResponse
        );
    }
}
