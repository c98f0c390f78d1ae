//! Concurrent bulk ingestion into an index cluster collection.
//!
//! A bulk push optionally creates the target collection, checks that it
//! answers a ping, then runs a fixed number of push workers as tokio tasks.
//! Each worker generates batches with its own [`document_generator`] state
//! and pushes them with batch-level retries. A [`CommitScheduler`] commits
//! the collection periodically while the workers run; once every worker has
//! joined, the scheduler is cancelled and a final commit makes all pushed
//! documents visible.
//!
//! ```text
//!            ┌── worker 0 ── generate ─ push ─┐
//! ping ──────┼── worker 1 ── generate ─ push ─┼── join ── stop scheduler ── commit
//!            └── worker N ── generate ─ push ─┘
//!       commit scheduler ── tick ─ commit ── tick ─ commit ...
//! ```

pub mod error;
pub mod ingestor;
pub mod options;
pub mod scheduler;
mod worker;

pub use error::IngestError;
pub use ingestor::{split_work, BulkIngestor, BulkPushReport};
pub use options::BulkPushOptions;
pub use scheduler::CommitScheduler;
pub use worker::WorkerReport;
