//! Bulk push lifecycle: setup, concurrent workers, periodic and final commit.

use crate::error::IngestError;
use crate::options::BulkPushOptions;
use crate::scheduler::CommitScheduler;
use crate::worker::PushWorker;
use cluster_client::{ClusterClient, PartitionRouter};
use document_generator::DocumentType;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, info_span, warn, Instrument, Span};

/// Summary of a finished bulk push.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkPushReport {
    pub collection: String,
    pub requested: usize,
    pub workers: usize,
    pub per_worker: usize,
    pub pushed: usize,
    /// Documents lost to integer division of the total across workers.
    pub dropped: usize,
    pub batches: usize,
    pub periodic_commits: u64,
    pub elapsed: Duration,
}

impl BulkPushReport {
    pub fn docs_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.pushed as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Share of each worker and the remainder no worker receives.
pub fn split_work(total_docs: usize, workers: usize) -> (usize, usize) {
    if workers == 0 {
        return (0, total_docs);
    }
    let per_worker = total_docs / workers;
    (per_worker, total_docs - workers * per_worker)
}

/// Pushes generated documents into a collection with concurrent workers.
#[derive(Debug, Clone)]
pub struct BulkIngestor {
    client: ClusterClient,
    router: PartitionRouter,
    span: Span,
}

impl BulkIngestor {
    pub fn new(client: ClusterClient) -> Self {
        let span = client.span().clone();
        Self {
            router: PartitionRouter::new(client.clone()),
            client,
            span,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.client = self.client.with_span(span.clone());
        self.router = self.router.with_span(span.clone());
        self.span = span;
        self
    }

    /// Push `total_docs` generated documents of `doc_type` into `collection`.
    ///
    /// Each of the workers pushes `total_docs / workers` documents; the
    /// remainder is not pushed and is reported as `dropped`. A commit runs
    /// every `commit_interval` while workers are active, and one final commit
    /// runs after all of them have joined, whether or not one failed. A worker
    /// failure is returned after that commit.
    pub async fn bulk_push(
        &self,
        collection: &str,
        total_docs: usize,
        doc_type: DocumentType,
        options: BulkPushOptions,
    ) -> Result<BulkPushReport, IngestError> {
        self.bulk_push_inner(collection, total_docs, doc_type, options)
            .instrument(self.span.clone())
            .await
    }

    async fn bulk_push_inner(
        &self,
        collection: &str,
        total_docs: usize,
        doc_type: DocumentType,
        options: BulkPushOptions,
    ) -> Result<BulkPushReport, IngestError> {
        options.validate()?;
        let start = Instant::now();

        let workers = if total_docs == 0 {
            0
        } else if options.workers > total_docs {
            1
        } else {
            options.workers
        };

        if options.create_collection {
            self.router
                .create_collection(&options.collection_spec(collection))
                .await?;
        }
        self.router.ping_collection(collection, false).await?;

        let (per_worker, dropped) = split_work(total_docs, workers);
        if dropped > 0 {
            warn!(
                "{dropped} of {total_docs} documents are not divisible across {workers} workers and will not be pushed"
            );
        }

        let options = Arc::new(options);
        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let span = info_span!(parent: &self.span, "push_worker", worker = id);
            let worker = PushWorker {
                id,
                client: self.client.clone().with_span(span.clone()),
                collection: collection.to_string(),
                doc_type,
                share: per_worker,
                options: options.clone(),
            };
            handles.push(tokio::spawn(worker.run().instrument(span)));
        }

        let scheduler = CommitScheduler::start(
            self.client.clone(),
            collection.to_string(),
            options.commit_interval,
            self.span.clone(),
        );

        let mut pushed = 0;
        let mut batches = 0;
        let mut failure = None;
        for (id, handle) in handles.into_iter().enumerate() {
            info!("Waiting for push worker {id}");
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(IngestError::WorkerPanicked {
                    worker: id,
                    message: e.to_string(),
                }),
            };
            match outcome {
                Ok(report) => {
                    info!("Push worker {id} stopped gracefully");
                    pushed += report.pushed;
                    batches += report.batches;
                }
                Err(e) => {
                    error!("Push worker {id} failed: {e}");
                    failure.get_or_insert(e);
                }
            }
        }

        info!("Cancelling the commit scheduler");
        let periodic_commits = scheduler.stop().await;

        // Batches acknowledged before a worker failed are still committed.
        let committed = self.client.commit(collection).await;
        if let Some(e) = failure {
            if let Err(commit_err) = committed {
                error!("Final commit for collection {collection} failed: {commit_err}");
            }
            return Err(e);
        }
        committed?;

        let report = BulkPushReport {
            collection: collection.to_string(),
            requested: total_docs,
            workers,
            per_worker,
            pushed,
            dropped,
            batches,
            periodic_commits,
            elapsed: start.elapsed(),
        };
        info!(
            "Bulk data generation finished for collection [{collection}] with doc count [{}] ({:.1} docs/s)",
            report.pushed,
            report.docs_per_second()
        );
        Ok(report)
    }
}
