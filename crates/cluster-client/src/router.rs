//! Hash-range partitioning of collections into cores.
//!
//! A collection is created by issuing one create-core call per hash range and
//! then asking the backend to recompute the collection's routing entry. The
//! client never caches routing data: every read goes to the backend.

use crate::client::{decode, dump_json, ClusterClient};
use crate::endpoints::Inventory;
use crate::error::{ClusterError, Result};
use crate::records::{CollectionRoute, SearchResponse};
use index_query::Query;
use serde_json::Value;
use tracing::{info, warn, Instrument, Span};

/// Default hash ranges, in the order cores are created.
pub const DEFAULT_ROUTE_RANGES: [&str; 8] = [
    "0-1fffffff",
    "80000000-9fffffff",
    "20000000-3fffffff",
    "a0000000-bfffffff",
    "c0000000-dfffffff",
    "40000000-5fffffff",
    "e0000000-ffffffff",
    "60000000-7fffffff",
];

pub const DEFAULT_CONFIG_SET: &str = "fsindexV2";
pub const DEFAULT_NUM_CORES: usize = 8;

/// Layout of a collection to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSpec {
    pub name: String,
    pub core_prefix: String,
    pub config_set: String,
    pub num_cores: usize,
    /// Hash range per core index. `None` uses [`DEFAULT_ROUTE_RANGES`].
    pub ranges: Option<Vec<String>>,
}

impl CollectionSpec {
    /// Spec with default config set and core count; cores are prefixed by the collection name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            core_prefix: name.clone(),
            name,
            config_set: DEFAULT_CONFIG_SET.to_string(),
            num_cores: DEFAULT_NUM_CORES,
            ranges: None,
        }
    }

    pub fn with_core_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.core_prefix = prefix.into();
        self
    }

    pub fn with_config_set(mut self, config_set: impl Into<String>) -> Self {
        self.config_set = config_set.into();
        self
    }

    pub fn with_num_cores(mut self, num_cores: usize) -> Self {
        self.num_cores = num_cores;
        self
    }

    pub fn with_ranges<I, S>(mut self, ranges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ranges = Some(ranges.into_iter().map(Into::into).collect());
        self
    }

    pub fn core_name(&self, index: usize) -> String {
        format!("{}_shards_{index}", self.core_prefix)
    }

    /// Hash range assigned to a core index, if the table has one.
    pub fn range(&self, index: usize) -> Option<&str> {
        match &self.ranges {
            Some(ranges) => ranges.get(index).map(String::as_str),
            None => DEFAULT_ROUTE_RANGES.get(index).copied(),
        }
    }
}

/// Collection lifecycle, routing and health checks.
#[derive(Debug, Clone)]
pub struct PartitionRouter {
    client: ClusterClient,
    span: Span,
}

impl PartitionRouter {
    pub fn new(client: ClusterClient) -> Self {
        let span = client.span().clone();
        Self { client, span }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.client = self.client.with_span(span.clone());
        self.span = span;
        self
    }

    pub fn client(&self) -> &ClusterClient {
        &self.client
    }

    /// Create every core of a collection, then register its routing entry.
    ///
    /// Cores are created in index order. The first rejected core aborts the
    /// call; cores created before it are left in place. Returns the created
    /// core names.
    pub async fn create_collection(&self, spec: &CollectionSpec) -> Result<Vec<String>> {
        self.create_collection_inner(spec)
            .instrument(self.span.clone())
            .await
    }

    async fn create_collection_inner(&self, spec: &CollectionSpec) -> Result<Vec<String>> {
        info!(
            "Creating collection {} with {} cores using config set {}",
            spec.name, spec.num_cores, spec.config_set
        );

        let mut created = Vec::with_capacity(spec.num_cores);
        for index in 0..spec.num_cores {
            let core = spec.core_name(index);
            let Some(range) = spec.range(index) else {
                return Err(ClusterError::CoreCreateFailed {
                    collection: spec.name.clone(),
                    core,
                    reason: format!("no hash range for core index {index}"),
                });
            };

            let url =
                self.client
                    .endpoints()
                    .create_core(&core, &spec.config_set, &spec.name, range);
            self.client
                .executor()
                .expect_success_envelope(&url)
                .await
                .map_err(|e| match e {
                    ClusterError::BackendRejected { body, .. } => {
                        ClusterError::CoreCreateFailed {
                            collection: spec.name.clone(),
                            core: core.clone(),
                            reason: body,
                        }
                    }
                    other => other,
                })?;
            info!("Created core {core} with route value {range}");
            created.push(core);
        }

        self.update_routes(&spec.name).await?;
        Ok(created)
    }

    /// Ask the backend to recompute the routing entry of a collection.
    pub async fn update_routes(&self, collection: &str) -> Result<()> {
        let url = self.client.endpoints().update_routes(collection);
        self.client
            .executor()
            .expect_success_envelope(&url)
            .instrument(self.span.clone())
            .await
            .map_err(|e| match e {
                ClusterError::BackendRejected { .. } => ClusterError::RouteUpdateFailed {
                    collection: collection.to_string(),
                },
                other => other,
            })?;
        info!(parent: &self.span, "Updated routes for collection {collection}");
        Ok(())
    }

    pub async fn delete_core(&self, core: &str) -> Result<()> {
        let url = self.client.endpoints().delete_core(core);
        self.client
            .executor()
            .expect_success_envelope(&url)
            .instrument(self.span.clone())
            .await
            .map_err(|e| match e {
                ClusterError::BackendRejected { .. } => ClusterError::CoreDeleteFailed {
                    core: core.to_string(),
                },
                other => other,
            })?;
        info!(parent: &self.span, "Deleted core {core}");
        Ok(())
    }

    /// Delete every core currently routed to `collection`.
    ///
    /// Stops at the first failed deletion without rolling back. Returns the
    /// number of cores deleted; an unknown collection deletes nothing.
    pub async fn delete_collection(&self, collection: &str) -> Result<usize> {
        self.delete_collection_inner(collection)
            .instrument(self.span.clone())
            .await
    }

    async fn delete_collection_inner(&self, collection: &str) -> Result<usize> {
        let routes = self.get_routing_table().await?;
        let Some(route) = routes.iter().find(|r| r.collection_name == collection) else {
            warn!("Collection {collection} not found in routing table");
            return Ok(0);
        };

        for core in &route.cores {
            self.delete_core(&core.name).await?;
        }
        info!(
            "Deleted {} cores of collection {collection}",
            route.cores.len()
        );
        Ok(route.cores.len())
    }

    /// Unload a collection from its serving nodes without deleting data.
    pub async fn unload_collection(&self, collection: &str) -> Result<()> {
        let url = self.client.endpoints().unload_collection(collection);
        self.client
            .executor()
            .expect_success_envelope(&url)
            .instrument(self.span.clone())
            .await
            .map_err(|e| match e {
                ClusterError::BackendRejected { .. } => ClusterError::UnloadFailed {
                    collection: collection.to_string(),
                },
                other => other,
            })?;
        info!(parent: &self.span, "Unloaded collection {collection}");
        Ok(())
    }

    pub async fn get_routing_table(&self) -> Result<Vec<CollectionRoute>> {
        self.client.routes().instrument(self.span.clone()).await
    }

    pub async fn get_all_collection_names(&self) -> Result<Vec<String>> {
        Ok(self
            .get_routing_table()
            .await?
            .into_iter()
            .map(|r| r.collection_name)
            .collect())
    }

    /// Health-check one core with a zero-row match-all select.
    pub async fn ping_core(&self, core: &str) -> Result<()> {
        let url = self.client.endpoints().ping_core(core);
        let body = self
            .client
            .executor()
            .get(&url)
            .instrument(self.span.clone())
            .await?;
        let ping_failed = || ClusterError::PingFailed {
            target: format!("core {core}"),
        };
        let parsed: SearchResponse = decode(&url, body.ok_or_else(ping_failed)?)?;
        match parsed.num_found() {
            Some(n) if n >= 0 => {
                info!(parent: &self.span, "Ping core {core} succeeded, numFound {n}");
                Ok(())
            }
            _ => Err(ping_failed()),
        }
    }

    /// Health-check a collection, optionally following with a match-all search.
    pub async fn ping_collection(&self, collection: &str, do_search: bool) -> Result<()> {
        self.ping_collection_inner(collection, do_search)
            .instrument(self.span.clone())
            .await
    }

    async fn ping_collection_inner(&self, collection: &str, do_search: bool) -> Result<()> {
        let url = self.client.endpoints().ping_collection(collection);
        let ping_failed = || ClusterError::PingFailed {
            target: format!("collection {collection}"),
        };
        let body = self.client.executor().get(&url).await?;
        let parsed: SearchResponse = decode(&url, body.ok_or_else(ping_failed)?)?;
        if parsed.status() != Some(0) {
            return Err(ping_failed());
        }
        info!("Ping collection {collection} succeeded");

        if do_search {
            let result = self
                .client
                .search_collection(collection, &Query::new())
                .await?;
            info!(
                "Search on collection {collection} found {} documents",
                result["response"]["numFound"]
            );
        }
        Ok(())
    }

    pub async fn get_cores(&self) -> Result<Value> {
        self.inventory(Inventory::Cores).await
    }

    pub async fn get_servers(&self) -> Result<Value> {
        self.inventory(Inventory::Servers).await
    }

    pub async fn get_volumes(&self) -> Result<Value> {
        self.inventory(Inventory::Volumes).await
    }

    async fn inventory(&self, inventory: Inventory) -> Result<Value> {
        let value = self
            .client
            .inventory(inventory)
            .instrument(self.span.clone())
            .await?;
        dump_json(&value);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_defaults() {
        let spec = CollectionSpec::new("files");
        assert_eq!(spec.num_cores, 8);
        assert_eq!(spec.config_set, "fsindexV2");
        assert_eq!(spec.core_name(3), "files_shards_3");
        assert_eq!(spec.range(1), Some("80000000-9fffffff"));
        assert_eq!(spec.range(8), None);
    }

    #[test]
    fn test_custom_ranges_replace_defaults() {
        let spec = CollectionSpec::new("files")
            .with_core_prefix("fs")
            .with_num_cores(2)
            .with_ranges(["0-7fffffff", "80000000-ffffffff"]);
        assert_eq!(spec.core_name(0), "fs_shards_0");
        assert_eq!(spec.range(1), Some("80000000-ffffffff"));
        assert_eq!(spec.range(2), None);
    }

    #[test]
    fn test_default_ranges_cover_hash_space() {
        let mut bounds: Vec<(u64, u64)> = DEFAULT_ROUTE_RANGES
            .iter()
            .map(|r| {
                let (lo, hi) = r.split_once('-').unwrap();
                (
                    u64::from_str_radix(lo, 16).unwrap(),
                    u64::from_str_radix(hi, 16).unwrap(),
                )
            })
            .collect();
        bounds.sort();
        assert_eq!(bounds[0].0, 0);
        assert_eq!(bounds[7].1, 0xffff_ffff);
        for pair in bounds.windows(2) {
            assert_eq!(pair[0].1 + 1, pair[1].0);
        }
    }
}
