//! Error types for bulk ingestion.

use cluster_client::ClusterError;
use document_generator::GeneratorError;
use thiserror::Error;

/// Errors that can end a bulk push.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Collection setup, ping or commit failure.
    #[error("Cluster error: {0}")]
    Cluster(#[from] ClusterError),

    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    /// A batch could not be pushed within the batch-level retry budget.
    #[error("Update request failed for collection '{collection}' after {attempts} attempts: {source}")]
    PushFailed {
        collection: String,
        attempts: u32,
        source: ClusterError,
    },

    #[error("Push worker {worker} terminated abnormally: {message}")]
    WorkerPanicked { worker: usize, message: String },

    #[error("Invalid bulk push options: {0}")]
    InvalidOptions(String),
}
