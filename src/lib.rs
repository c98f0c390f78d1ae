//! index-cluster
//!
//! Client-side control and data plane for a sharded search index cluster.
//!
//! # Components
//!
//! - [`index_query`] - select query strings from typed filters
//! - [`cluster_client`] - request executor, partition router, random collection
//!   loader and cluster stats
//! - [`document_generator`] - synthetic file-metadata records
//! - [`bulk_ingest`] - concurrent batched ingestion with periodic commits
//!
//! # CLI Usage
//!
//! ```bash
//! # Create a collection over the default 8 hash ranges
//! index-cluster --cluster-url 10.0.0.5 create-collection files
//!
//! # Push one million generated records with 4 workers
//! index-cluster bulk-push files --total-docs 1000000 --workers 4 --commit-interval 15m
//!
//! # Filtered search
//! index-cluster search files --eq FileExtension=pdf --any ClientId=1,2 --fl FileName,Size
//! ```

use clap::Parser;
use cluster_client::{ClientConfig, RetryPolicy};
use std::time::Duration;

pub mod config;

pub use config::parse_duration;

#[derive(Parser, Clone, Debug)]
pub struct ClusterOpts {
    /// Cluster base URL; a bare host is served over http
    #[arg(long, default_value = "http://localhost", env = "INDEX_CLUSTER_URL")]
    pub cluster_url: String,

    /// Attempts per request before giving up
    #[arg(long, default_value = "3", env = "INDEX_CLUSTER_REQUEST_ATTEMPTS")]
    pub request_attempts: u32,

    /// Pause between request attempts
    #[arg(long, default_value = "5s", value_parser = parse_duration)]
    pub request_backoff: Duration,

    /// Timeout of a single request attempt
    #[arg(long, default_value = "60s", value_parser = parse_duration)]
    pub request_timeout: Duration,
}

impl From<&ClusterOpts> for ClientConfig {
    fn from(opts: &ClusterOpts) -> Self {
        ClientConfig::new(opts.cluster_url.clone()).with_retry(
            RetryPolicy::default()
                .with_attempts(opts.request_attempts)
                .with_backoff(opts.request_backoff)
                .with_timeout(opts.request_timeout),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        cluster: ClusterOpts,
    }

    #[test]
    fn test_cluster_opts_defaults() {
        let cli = TestCli::try_parse_from(["test"]).unwrap();
        let config = ClientConfig::from(&cli.cluster);
        assert_eq!(config.retry.attempts, 3);
        assert_eq!(config.retry.backoff, Duration::from_secs(5));
        assert_eq!(config.retry.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_cluster_opts_flags() {
        let cli = TestCli::try_parse_from([
            "test",
            "--cluster-url",
            "10.0.0.5",
            "--request-attempts",
            "5",
            "--request-backoff",
            "250ms",
            "--request-timeout",
            "2m",
        ])
        .unwrap();
        let config = ClientConfig::from(&cli.cluster);
        assert_eq!(config.base_url, "10.0.0.5");
        assert_eq!(config.retry.attempts, 5);
        assert_eq!(config.retry.backoff, Duration::from_millis(250));
        assert_eq!(config.retry.timeout, Duration::from_secs(120));
    }
}
