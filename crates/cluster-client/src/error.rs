//! Error types for cluster requests and administrative operations.

use thiserror::Error;

/// Errors raised by the request executor and the components built on it.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Network or HTTP-level failure of a single attempt. Retried by the executor.
    #[error("Transport failure for {url} (status: {status:?}): {message}")]
    Transport {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// The backend answered with a well-formed but unsuccessful envelope.
    #[error("Backend rejected request {url}: {body}")]
    BackendRejected { url: String, body: String },

    /// Every attempt failed at the transport level.
    #[error("Http call failed even after {attempts} attempts for url: {url}")]
    RequestExhausted { url: String, attempts: u32 },

    #[error("Core creation failed for '{core}' in collection '{collection}': {reason}")]
    CoreCreateFailed {
        collection: String,
        core: String,
        reason: String,
    },

    #[error("Routing update failed for collection '{collection}'")]
    RouteUpdateFailed { collection: String },

    #[error("Core deletion failed for '{core}'")]
    CoreDeleteFailed { core: String },

    #[error("Unload failed for collection '{collection}'")]
    UnloadFailed { collection: String },

    #[error("Ping check failed for {target}")]
    PingFailed { target: String },

    #[error("Commit failed for collection '{collection}'")]
    CommitFailed { collection: String },

    #[error("Update request failed for collection '{collection}': {reason}")]
    UpdateRejected { collection: String, reason: String },

    #[error("Requested {requested} collections but only {available} are available")]
    InsufficientCollections { requested: usize, available: usize },

    /// A success status with a decodable body of the wrong shape.
    #[error("Unexpected response from {url}: {detail}")]
    UnexpectedResponse { url: String, detail: String },

    /// The call returned no content where a body was required.
    #[error("Empty response from {url}")]
    EmptyResponse { url: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl ClusterError {
    /// True for failures the executor retries.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClusterError::Transport { .. })
    }
}

pub type Result<T> = std::result::Result<T, ClusterError>;
