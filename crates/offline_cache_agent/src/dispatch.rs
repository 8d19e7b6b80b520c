//! Mapping from host events to agent handlers.

use std::{fmt, str::FromStr};

use offline_host::CacheRequest;

use crate::{
    agent::OfflineCacheAgent,
    error::AgentError,
    report::{ActivateReport, FetchOutcome, InstallReport},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Host event types the agent handles.
pub enum EventKind {
    /// Worker installation: pre-cache the manifest.
    Install,
    /// Worker activation: drop stale generations.
    Activate,
    /// Request interception.
    Fetch,
}

impl EventKind {
    /// Every handled event type, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Install, Self::Activate, Self::Fetch];

    /// Host event type string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Activate => "activate",
            Self::Fetch => "fetch",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = AgentError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == raw)
            .ok_or_else(|| AgentError::UnknownEvent(raw.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One event delivered by the host.
pub enum LifecycleEvent {
    /// `install` signal.
    Install,
    /// `activate` signal.
    Activate,
    /// `fetch` interception carrying the inbound request.
    Fetch(CacheRequest),
}

impl LifecycleEvent {
    /// Returns the event type.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Install => EventKind::Install,
            Self::Activate => EventKind::Activate,
            Self::Fetch(_) => EventKind::Fetch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of one dispatched event.
pub enum HandlerOutcome {
    /// Install completed.
    Installed(InstallReport),
    /// Activate completed.
    Activated(ActivateReport),
    /// Fetch answered, possibly with [`FetchOutcome::NoResponse`].
    Responded(FetchOutcome),
}

impl OfflineCacheAgent {
    /// Routes `event` to its handler and waits for it to settle.
    ///
    /// # Errors
    ///
    /// Returns the install or activate handler's error. Fetch never fails.
    pub async fn dispatch(&self, event: LifecycleEvent) -> Result<HandlerOutcome, AgentError> {
        match event {
            LifecycleEvent::Install => Ok(HandlerOutcome::Installed(self.install().await?)),
            LifecycleEvent::Activate => Ok(HandlerOutcome::Activated(self.activate().await?)),
            LifecycleEvent::Fetch(request) => {
                Ok(HandlerOutcome::Responded(self.fetch(&request).await))
            }
        }
    }
}
