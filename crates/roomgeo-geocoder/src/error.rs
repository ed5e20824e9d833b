use thiserror::Error;

/// Errors surfaced by the geocoding subsystem.
///
/// Resolution failures (`InvalidInput`, `NoMatch`, `ProviderUnavailable`,
/// `OutOfBounds`) and `Persistence` are expected outcomes and are carried as
/// values. The remaining variants are construction-time errors.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The address was empty or whitespace only.
    #[error("address is empty")]
    InvalidInput,

    /// The provider answered successfully with zero candidates.
    #[error("provider returned no match for \"{query}\"")]
    NoMatch { query: String },

    /// Network, timeout, or non-success status after all attempts.
    #[error("provider unavailable after {attempts} attempt(s): {reason}")]
    ProviderUnavailable { attempts: u32, reason: String },

    /// The provider's coordinates fell outside the configured region.
    #[error("provider returned ({latitude}, {longitude}), outside the configured region")]
    OutOfBounds { latitude: f64, longitude: f64 },

    /// The injected persistence collaborator rejected an update.
    #[error("failed to persist record {record_id}: {reason}")]
    Persistence { record_id: String, reason: String },

    #[error("invalid region configuration: {0}")]
    InvalidRegion(String),

    #[error("invalid provider base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

/// Coarse failure taxonomy used in logs and batch summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidInput,
    NoMatch,
    ProviderUnavailable,
    OutOfBounds,
    PersistenceFailure,
    Configuration,
}

impl GeocodeError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            GeocodeError::InvalidInput => FailureKind::InvalidInput,
            GeocodeError::NoMatch { .. } => FailureKind::NoMatch,
            GeocodeError::ProviderUnavailable { .. } => FailureKind::ProviderUnavailable,
            GeocodeError::OutOfBounds { .. } => FailureKind::OutOfBounds,
            GeocodeError::Persistence { .. } => FailureKind::PersistenceFailure,
            GeocodeError::InvalidRegion(_)
            | GeocodeError::InvalidBaseUrl { .. }
            | GeocodeError::ClientBuild(_) => FailureKind::Configuration,
        }
    }
}

/// Failure of a single provider attempt, before the retry policy decides
/// what to do with it.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed candidate: {0}")]
    MalformedCandidate(String),

    #[error("no candidates for \"{query}\"")]
    NoMatch { query: String },
}
