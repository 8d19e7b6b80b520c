use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Invalid generation name or asset manifest.
pub enum ConfigError {
    /// The generation name is empty or whitespace.
    #[error("cache generation name is empty")]
    EmptyGeneration,
    /// A manifest entry is empty or whitespace.
    #[error("asset manifest entry {index} is empty")]
    EmptyAssetId {
        /// Position of the entry in the manifest.
        index: usize,
    },
    /// The same identifier appears twice.
    #[error("asset manifest lists `{0}` more than once")]
    DuplicateAsset(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Install failures. Either one leaves the generation not ready.
pub enum InstallError {
    /// The current generation's store could not be opened or created.
    #[error("failed to open cache `{generation}`: {reason}")]
    Open {
        /// Generation being installed.
        generation: String,
        /// Host-reported cause.
        reason: String,
    },
    /// At least one manifest entry could not be fetched or stored.
    #[error("failed to pre-cache assets into `{generation}`: {reason}")]
    Populate {
        /// Generation being installed.
        generation: String,
        /// Host-reported cause.
        reason: String,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Activate failures.
pub enum ActivateError {
    /// Existing generation names could not be enumerated.
    #[error("failed to list cache generations: {0}")]
    ListNames(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors surfaced through the event dispatch table.
pub enum AgentError {
    /// The host delivered an event type the agent does not handle.
    #[error("unknown event type `{0}`")]
    UnknownEvent(String),
    /// Install handler failure.
    #[error(transparent)]
    Install(#[from] InstallError),
    /// Activate handler failure.
    #[error(transparent)]
    Activate(#[from] ActivateError),
}
