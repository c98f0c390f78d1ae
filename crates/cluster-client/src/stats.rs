//! Cluster-wide capacity and document statistics.
//!
//! Stats are computed fresh on every call from the volume and routing
//! inventories; nothing is cached or persisted.

use crate::client::{dump_json, ClusterClient};
use crate::error::Result;
use crate::humanize::{format_count, format_size};
use crate::records::{CollectionRoute, VolumeInfo};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, Instrument, Span};

/// Usage of one volume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VolumeStats {
    pub capacity_bytes: u64,
    pub used_bytes: u64,
    pub cores: usize,
}

/// Totals across all volumes and all routed cores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClusterStats {
    pub total_volumes: usize,
    pub total_capacity_bytes: u64,
    pub total_used_bytes: u64,
    pub total_cores_in_volumes: usize,
    pub per_volume: BTreeMap<String, VolumeStats>,
    pub total_docs: u64,
}

impl ClusterStats {
    /// Fold volume and routing inventories into totals.
    pub fn from_parts(volumes: &[VolumeInfo], routes: &[CollectionRoute]) -> Self {
        let mut stats = volumes.iter().fold(Self::default(), |mut acc, volume| {
            acc.total_volumes += 1;
            acc.total_capacity_bytes += volume.capacity;
            acc.total_used_bytes += volume.used;
            acc.total_cores_in_volumes += volume.cores.len();
            acc.per_volume.insert(
                volume.name.clone(),
                VolumeStats {
                    capacity_bytes: volume.capacity,
                    used_bytes: volume.used,
                    cores: volume.cores.len(),
                },
            );
            acc
        });

        stats.total_docs = routes
            .iter()
            .flat_map(|route| &route.cores)
            .map(|core| core.docs)
            .sum();
        stats
    }

    pub fn summary(&self) -> ClusterStatsSummary {
        ClusterStatsSummary {
            total_volumes: self.total_volumes,
            total_capacity: format_size(self.total_capacity_bytes),
            total_used: format_size(self.total_used_bytes),
            total_cores_in_volumes: self.total_cores_in_volumes,
            per_volume: self
                .per_volume
                .iter()
                .map(|(name, v)| {
                    (
                        name.clone(),
                        VolumeSummary {
                            capacity: format_size(v.capacity_bytes),
                            used: format_size(v.used_bytes),
                            cores: v.cores,
                        },
                    )
                })
                .collect(),
            total_docs: format_count(self.total_docs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeSummary {
    pub capacity: String,
    pub used: String,
    pub cores: usize,
}

/// Human-readable form of [`ClusterStats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterStatsSummary {
    pub total_volumes: usize,
    pub total_capacity: String,
    pub total_used: String,
    pub total_cores_in_volumes: usize,
    pub per_volume: BTreeMap<String, VolumeSummary>,
    pub total_docs: String,
}

/// Size and document totals of one loaded collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedCollectionStats {
    pub name: String,
    pub ingress_server_id: String,
    pub total_cores: usize,
    /// Distinct servers hosting the collection's cores, in first-seen order.
    pub core_servers: Vec<String>,
    pub total_docs: u64,
    pub total_docs_str: String,
    pub total_size: u64,
    pub total_size_str: String,
}

impl LoadedCollectionStats {
    /// Stats for a route, or `None` when the collection is not loaded.
    pub fn from_route(route: &CollectionRoute) -> Option<Self> {
        if !route.is_loaded() {
            return None;
        }

        let mut seen = BTreeSet::new();
        let core_servers = route
            .cores
            .iter()
            .filter(|core| seen.insert(core.server_id.as_str()))
            .map(|core| core.server_id.clone())
            .collect();
        let total_docs = route.cores.iter().map(|c| c.docs).sum();
        let total_size = route.cores.iter().map(|c| c.size).sum();

        Some(Self {
            name: route.collection_name.clone(),
            ingress_server_id: route.ingress_server_id.clone(),
            total_cores: route.cores.len(),
            core_servers,
            total_docs,
            total_docs_str: format_count(total_docs),
            total_size,
            total_size_str: format_size(total_size),
        })
    }
}

/// Reads inventories and folds them into stats.
#[derive(Debug, Clone)]
pub struct StatsAggregator {
    client: ClusterClient,
    span: Span,
}

impl StatsAggregator {
    pub fn new(client: ClusterClient) -> Self {
        let span = client.span().clone();
        Self { client, span }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.client = self.client.with_span(span.clone());
        self.span = span;
        self
    }

    pub async fn cluster_stats(&self) -> Result<ClusterStats> {
        let volumes = self
            .client
            .volumes()
            .instrument(self.span.clone())
            .await?;
        let routes = self.client.routes().instrument(self.span.clone()).await?;
        let stats = ClusterStats::from_parts(&volumes, &routes);
        info!(
            parent: &self.span,
            "Cluster has {} volumes, {} cores and {} documents",
            stats.total_volumes,
            stats.total_cores_in_volumes,
            stats.total_docs
        );
        Ok(stats)
    }

    /// Stats of every loaded collection, keyed by name.
    pub async fn loaded_collection_stats(
        &self,
        dump_in_log: bool,
    ) -> Result<BTreeMap<String, LoadedCollectionStats>> {
        let routes = self.client.routes().instrument(self.span.clone()).await?;
        let output: BTreeMap<_, _> = routes
            .iter()
            .filter_map(LoadedCollectionStats::from_route)
            .map(|stats| (stats.name.clone(), stats))
            .collect();

        if dump_in_log {
            match serde_json::to_value(&output) {
                Ok(value) => dump_json(&value),
                Err(e) => tracing::debug!(parent: &self.span, "Failed to encode stats: {e}"),
            }
        }
        Ok(output)
    }
}
