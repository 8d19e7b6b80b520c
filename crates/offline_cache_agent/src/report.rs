//! Handler results reported back to the host.

use offline_host::CacheResponse;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Successful install: the generation holds every manifest entry.
pub struct InstallReport {
    /// Generation that was populated.
    pub generation: String,
    /// Manifest identifiers now cached, in manifest order.
    pub cached: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One stale generation that could not be deleted.
pub struct DeleteFailure {
    /// Generation name.
    pub name: String,
    /// Host-reported cause.
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Outcome of a cleanup pass.
///
/// Deletion is best effort, so a completed activation can still carry failures. They are
/// retried by the next activation, which enumerates again.
pub struct ActivateReport {
    /// Generation that was kept.
    pub current: String,
    /// Stale generations removed by this pass, in enumeration order.
    pub deleted: Vec<String>,
    /// Stale generations still present after this pass.
    pub failed: Vec<DeleteFailure>,
}

impl ActivateReport {
    /// Returns `true` when every stale generation is gone.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Response chosen for an intercepted request.
pub enum FetchOutcome {
    /// Live network response, returned verbatim whatever its status.
    Network(CacheResponse),
    /// Stored response served because the network failed.
    Cache(CacheResponse),
    /// Neither network nor any store could answer. The host shows its own network error; this
    /// is not a handler failure.
    NoResponse,
}

impl FetchOutcome {
    /// Borrows the response, if any.
    pub fn response(&self) -> Option<&CacheResponse> {
        match self {
            Self::Network(response) | Self::Cache(response) => Some(response),
            Self::NoResponse => None,
        }
    }

    /// Consumes the outcome and returns the response, if any.
    pub fn into_response(self) -> Option<CacheResponse> {
        match self {
            Self::Network(response) | Self::Cache(response) => Some(response),
            Self::NoResponse => None,
        }
    }

    /// Returns `true` for [`FetchOutcome::NoResponse`].
    pub fn is_no_response(&self) -> bool {
        matches!(self, Self::NoResponse)
    }
}
