//! Tunables of a bulk push.

use crate::error::IngestError;
use cluster_client::{CollectionSpec, DEFAULT_CONFIG_SET, DEFAULT_NUM_CORES};
use document_generator::ContentOptions;
use serde_json::{Map, Value};
use std::time::Duration;

/// Documents per push request.
pub const DEFAULT_BATCH_SIZE: usize = 50;
/// Period of the background commit.
pub const DEFAULT_COMMIT_INTERVAL: Duration = Duration::from_secs(900);
/// Attempts per batch, on top of the request executor's own retries.
pub const DEFAULT_PUSH_ATTEMPTS: u32 = 3;
pub const DEFAULT_PUSH_BACKOFF: Duration = Duration::from_secs(60);
/// Text caches are rebuilt before every batch whose number is a multiple of this.
pub const DEFAULT_CACHE_REFRESH_BATCHES: usize = 100;

#[derive(Debug, Clone)]
pub struct BulkPushOptions {
    pub batch_size: usize,
    pub workers: usize,
    /// Create the collection before pushing.
    pub create_collection: bool,
    pub num_cores: usize,
    pub config_set: String,
    /// Hash ranges for created cores. `None` uses the default table.
    pub ranges: Option<Vec<String>>,
    pub with_content: bool,
    pub content: ContentOptions,
    pub commit_interval: Duration,
    pub push_attempts: u32,
    pub push_backoff: Duration,
    pub cache_refresh_batches: usize,
    /// Fields merged into every generated document.
    pub extra_fields: Map<String, Value>,
    /// Base seed for reproducible documents; worker `i` uses `seed + i`.
    pub seed: Option<u64>,
}

impl Default for BulkPushOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            workers: 1,
            create_collection: false,
            num_cores: DEFAULT_NUM_CORES,
            config_set: DEFAULT_CONFIG_SET.to_string(),
            ranges: None,
            with_content: false,
            content: ContentOptions::default(),
            commit_interval: DEFAULT_COMMIT_INTERVAL,
            push_attempts: DEFAULT_PUSH_ATTEMPTS,
            push_backoff: DEFAULT_PUSH_BACKOFF,
            cache_refresh_batches: DEFAULT_CACHE_REFRESH_BATCHES,
            extra_fields: Map::new(),
            seed: None,
        }
    }
}

impl BulkPushOptions {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_create_collection(mut self, create: bool) -> Self {
        self.create_collection = create;
        self
    }

    pub fn with_num_cores(mut self, num_cores: usize) -> Self {
        self.num_cores = num_cores;
        self
    }

    pub fn with_config_set(mut self, config_set: impl Into<String>) -> Self {
        self.config_set = config_set.into();
        self
    }

    pub fn with_ranges(mut self, ranges: Vec<String>) -> Self {
        self.ranges = Some(ranges);
        self
    }

    pub fn with_content(mut self, content: ContentOptions) -> Self {
        self.with_content = true;
        self.content = content;
        self
    }

    pub fn with_commit_interval(mut self, interval: Duration) -> Self {
        self.commit_interval = interval;
        self
    }

    pub fn with_push_retry(mut self, attempts: u32, backoff: Duration) -> Self {
        self.push_attempts = attempts;
        self.push_backoff = backoff;
        self
    }

    pub fn with_cache_refresh_batches(mut self, batches: usize) -> Self {
        self.cache_refresh_batches = batches;
        self
    }

    pub fn with_extra_fields(mut self, extra: Map<String, Value>) -> Self {
        self.extra_fields = extra;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), IngestError> {
        if self.batch_size == 0 {
            return Err(IngestError::InvalidOptions(
                "batch size must be greater than zero".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(IngestError::InvalidOptions(
                "worker count must be greater than zero".to_string(),
            ));
        }
        if self.commit_interval.is_zero() {
            return Err(IngestError::InvalidOptions(
                "commit interval must be greater than zero".to_string(),
            ));
        }
        if self.with_content && self.content.max_sentences.is_empty() {
            return Err(IngestError::InvalidOptions(
                "content sentence range is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Layout used when the collection is created as part of the push.
    pub fn collection_spec(&self, collection: &str) -> CollectionSpec {
        let spec = CollectionSpec::new(collection)
            .with_config_set(self.config_set.clone())
            .with_num_cores(self.num_cores);
        match &self.ranges {
            Some(ranges) => spec.with_ranges(ranges.iter().cloned()),
            None => spec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = BulkPushOptions::default();
        assert_eq!(options.batch_size, 50);
        assert_eq!(options.workers, 1);
        assert_eq!(options.commit_interval, Duration::from_secs(900));
        assert_eq!(options.push_attempts, 3);
        assert_eq!(options.push_backoff, Duration::from_secs(60));
        assert_eq!(options.cache_refresh_batches, 100);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = BulkPushOptions::default()
            .with_batch_size(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, IngestError::InvalidOptions(_)));
    }

    #[test]
    fn test_zero_commit_interval_rejected() {
        let err = BulkPushOptions::default()
            .with_commit_interval(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert!(matches!(err, IngestError::InvalidOptions(_)));
    }

    #[test]
    fn test_collection_spec() {
        let spec = BulkPushOptions::default()
            .with_num_cores(2)
            .with_config_set("custom")
            .with_ranges(vec!["0-7fffffff".into(), "80000000-ffffffff".into()])
            .collection_spec("files");
        assert_eq!(spec.core_name(1), "files_shards_1");
        assert_eq!(spec.config_set, "custom");
        assert_eq!(spec.range(1), Some("80000000-ffffffff"));
    }
}
