//! A single push worker: generate, push, repeat until its share is done.

use crate::error::IngestError;
use crate::options::BulkPushOptions;
use cluster_client::ClusterClient;
use document_generator::{
    CachedTextGenerator, Document, DocumentGenerator, DocumentType, TextGenerator,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Outcome of one worker.
#[derive(Debug, Clone, Default)]
pub struct WorkerReport {
    pub pushed: usize,
    pub batches: usize,
    pub elapsed: Duration,
}

pub(crate) struct PushWorker {
    pub id: usize,
    pub client: ClusterClient,
    pub collection: String,
    pub doc_type: DocumentType,
    pub share: usize,
    pub options: Arc<BulkPushOptions>,
}

impl PushWorker {
    pub async fn run(self) -> Result<WorkerReport, IngestError> {
        let start = Instant::now();
        let options = &self.options;
        let seed = options.seed.map(|s| s.wrapping_add(self.id as u64));

        let mut generator = match seed {
            Some(seed) => DocumentGenerator::with_seed(seed),
            None => DocumentGenerator::new(),
        }
        .with_content_options(options.content.clone());

        let mut text = if options.with_content {
            info!("Initializing text generator word/sentence caches");
            Some(match seed {
                Some(seed) => CachedTextGenerator::with_seed(seed, options.content.clone()),
                None => CachedTextGenerator::new(options.content.clone()),
            })
        } else {
            None
        };

        let extra = (!options.extra_fields.is_empty()).then_some(&options.extra_fields);
        let batch_size = options.batch_size.min(self.share);
        let mut report = WorkerReport::default();
        let mut batch_no = 1;

        info!(
            "Generating total data [{}] of type [{}]",
            self.share, self.doc_type
        );
        while report.pushed < self.share {
            if let Some(text) = text.as_mut() {
                if options.cache_refresh_batches > 0 && batch_no % options.cache_refresh_batches == 0
                {
                    info!("Re-initializing text generator word/sentence caches");
                    text.reset_caches();
                }
            }

            let size = batch_size.min(self.share - report.pushed);
            info!("Processing batch [{batch_no}] containing [{size}] documents");
            let docs = generator.generate(
                self.doc_type,
                size,
                options.with_content,
                text.as_mut().map(|t| t as &mut dyn TextGenerator),
                extra,
            )?;
            self.push_batch(&docs).await?;

            report.pushed += size;
            report.batches += 1;
            batch_no += 1;
        }

        report.elapsed = start.elapsed();
        info!(
            "Finished processing for type [{}] and doc count [{}] in {:?}",
            self.doc_type, self.share, report.elapsed
        );
        Ok(report)
    }

    async fn push_batch(&self, docs: &[Document]) -> Result<(), IngestError> {
        let attempts = self.options.push_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.client.push_documents(&self.collection, docs).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt >= attempts => {
                    return Err(IngestError::PushFailed {
                        collection: self.collection.clone(),
                        attempts,
                        source: e,
                    });
                }
                Err(e) => {
                    warn!(
                        "Push to {} failed (attempt {attempt}/{attempts}): {e}. Retrying after {:?}",
                        self.collection, self.options.push_backoff
                    );
                    tokio::time::sleep(self.options.push_backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}
