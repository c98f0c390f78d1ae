//! Client for a hash-partitioned search index cluster.
//!
//! All requests go through a [`RequestExecutor`] with a bounded retry policy.
//! On top of it:
//!
//! - [`ClusterClient`] runs searches, commits, document pushes and inventory reads
//! - [`PartitionRouter`] creates and deletes collections as sets of hash-range cores
//! - [`CollectionLoader`] pings a random sample of collections
//! - [`StatsAggregator`] folds volume and routing inventories into cluster totals
//!
//! Each component takes a [`tracing::Span`] through `with_span` and records
//! its requests under it.

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod humanize;
pub mod loader;
pub mod records;
pub mod request;
pub mod router;
pub mod stats;

#[cfg(feature = "testing")]
pub mod testing;

pub use client::{dump_json, ClusterClient};
pub use config::{ClientConfig, RetryPolicy};
pub use endpoints::{Endpoints, Inventory};
pub use error::{ClusterError, Result};
pub use loader::CollectionLoader;
pub use records::{CollectionRoute, CoreInfo, SearchResponse, VolumeInfo};
pub use request::RequestExecutor;
pub use router::{
    CollectionSpec, PartitionRouter, DEFAULT_CONFIG_SET, DEFAULT_NUM_CORES, DEFAULT_ROUTE_RANGES,
};
pub use stats::{ClusterStats, ClusterStatsSummary, LoadedCollectionStats, StatsAggregator};
