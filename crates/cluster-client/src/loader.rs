//! Random collection load checks.

use crate::error::{ClusterError, Result};
use crate::router::PartitionRouter;
use rand::seq::IndexedRandom;
use tokio::sync::mpsc;
use tracing::{error, info, info_span, warn, Instrument, Span};

/// Pings a random sample of collections, loading them on the serving nodes.
#[derive(Debug, Clone)]
pub struct CollectionLoader {
    router: PartitionRouter,
    span: Span,
}

impl CollectionLoader {
    pub fn new(router: PartitionRouter) -> Self {
        Self {
            router,
            span: Span::none(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.router = self.router.with_span(span.clone());
        self.span = span;
        self
    }

    /// Sample `count` collections from the routing table and ping each.
    ///
    /// Returns the collections that answered, in sampled order.
    pub async fn random_load(
        &self,
        count: usize,
        do_search: bool,
        parallel: bool,
    ) -> Result<Vec<String>> {
        let names = self
            .router
            .get_all_collection_names()
            .instrument(self.span.clone())
            .await?;
        self.random_load_from(&names, count, do_search, parallel)
            .await
    }

    /// Same as [`random_load`](Self::random_load) over a known set of names.
    ///
    /// Fails with [`ClusterError::InsufficientCollections`] before any request
    /// when `count` exceeds the number of names.
    pub async fn random_load_from(
        &self,
        names: &[String],
        count: usize,
        do_search: bool,
        parallel: bool,
    ) -> Result<Vec<String>> {
        if count > names.len() {
            return Err(ClusterError::InsufficientCollections {
                requested: count,
                available: names.len(),
            });
        }

        let sample: Vec<String> = {
            let mut rng = rand::rng();
            names
                .choose_multiple(&mut rng, count)
                .cloned()
                .collect()
        };
        info!(parent: &self.span, "Randomly selected collections: {sample:?}");

        if parallel {
            self.load_parallel(sample, do_search)
                .instrument(self.span.clone())
                .await
        } else {
            self.load_sequential(sample, do_search)
                .instrument(self.span.clone())
                .await
        }
    }

    async fn load_sequential(&self, sample: Vec<String>, do_search: bool) -> Result<Vec<String>> {
        let mut loaded = Vec::with_capacity(sample.len());
        for name in sample {
            match self.router.ping_collection(&name, do_search).await {
                Ok(()) => loaded.push(name),
                Err(e) => warn!("Failed to load collection {name}: {e}"),
            }
        }
        info!("Loaded {} collections", loaded.len());
        Ok(loaded)
    }

    async fn load_parallel(&self, sample: Vec<String>, do_search: bool) -> Result<Vec<String>> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handles = Vec::with_capacity(sample.len());

        for (index, name) in sample.iter().enumerate() {
            let router = self.router.clone();
            let tx = tx.clone();
            let name = name.clone();
            let span = info_span!(parent: &self.span, "load", collection = %name);
            handles.push(tokio::spawn(
                async move {
                    let outcome = router.ping_collection(&name, do_search).await;
                    // Receiver outlives every task.
                    let _ = tx.send((index, outcome.map_err(|e| e.to_string())));
                }
                .instrument(span),
            ));
        }
        drop(tx);

        let mut outcomes: Vec<Option<std::result::Result<(), String>>> = vec![None; sample.len()];
        for (handle, name) in handles.into_iter().zip(&sample) {
            if let Err(e) = handle.await {
                error!("Load task for collection {name} did not finish: {e}");
            }
        }
        while let Some((index, outcome)) = rx.recv().await {
            outcomes[index] = Some(outcome);
        }

        let mut loaded = Vec::with_capacity(sample.len());
        let mut failures = Vec::new();
        for (name, outcome) in sample.into_iter().zip(outcomes) {
            match outcome {
                Some(Ok(())) => loaded.push(name),
                Some(Err(e)) => failures.push(format!("{name}: {e}")),
                None => failures.push(format!("{name}: task aborted")),
            }
        }

        if !failures.is_empty() {
            error!("==================================================");
            error!("{} of {} collection loads failed", failures.len(), loaded.len() + failures.len());
            for failure in &failures {
                error!("  {failure}");
            }
            error!("==================================================");
        }
        info!("Loaded {} collections", loaded.len());
        Ok(loaded)
    }
}
