//! Data-plane and inventory operations against a cluster.

use crate::config::ClientConfig;
use crate::endpoints::{Endpoints, Inventory};
use crate::error::{ClusterError, Result};
use crate::records::{CollectionRoute, SearchResponse, VolumeInfo};
use crate::request::RequestExecutor;
use index_query::Query;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, Span};

/// Handle to one cluster. Cheap to clone; holds no routing cache.
#[derive(Debug, Clone)]
pub struct ClusterClient {
    executor: RequestExecutor,
    endpoints: Endpoints,
}

impl ClusterClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let executor = RequestExecutor::new(config.retry.clone())?;
        Ok(Self::from_parts(executor, Endpoints::new(&config.base_url)))
    }

    pub fn from_parts(executor: RequestExecutor, endpoints: Endpoints) -> Self {
        Self {
            executor,
            endpoints,
        }
    }

    /// Attach the logging context requests are recorded under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.executor = self.executor.with_span(span);
        self
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn span(&self) -> &Span {
        self.executor.span()
    }

    /// Run a select query; the body must carry `response.numFound`.
    pub async fn search_collection(&self, collection: &str, query: &Query) -> Result<Value> {
        let url = self.endpoints.select(collection, query);
        let body = self.executor.get_required(&url).await?;
        let parsed: SearchResponse = decode(&url, body.clone())?;
        if parsed.num_found().is_none() {
            return Err(ClusterError::UnexpectedResponse {
                url,
                detail: format!("missing response.numFound for collection {collection}"),
            });
        }
        Ok(body)
    }

    /// Make pushed documents visible to queries.
    pub async fn commit(&self, collection: &str) -> Result<()> {
        let url = self.endpoints.commit(collection);
        let body = self.executor.get_required(&url).await?;
        let parsed: SearchResponse = decode(&url, body)?;
        if parsed.status() != Some(0) {
            return Err(ClusterError::CommitFailed {
                collection: collection.to_string(),
            });
        }
        info!("Successfully called commit for collection - {collection}");
        Ok(())
    }

    /// Push one batch of documents to a collection's update handler.
    pub async fn push_documents<T: Serialize>(&self, collection: &str, docs: &[T]) -> Result<()> {
        let url = self.endpoints.update(collection);
        let payload = serde_json::to_value(docs).map_err(|e| ClusterError::UnexpectedResponse {
            url: url.clone(),
            detail: format!("failed to encode documents: {e}"),
        })?;
        let body = self.executor.post_json(&url, &payload).await?;
        let Some(body) = body else {
            return Err(ClusterError::UpdateRejected {
                collection: collection.to_string(),
                reason: "empty response".to_string(),
            });
        };
        let parsed: SearchResponse = decode(&url, body)?;
        match parsed.status() {
            Some(0) => Ok(()),
            status => Err(ClusterError::UpdateRejected {
                collection: collection.to_string(),
                reason: format!("response status {status:?}"),
            }),
        }
    }

    /// Raw inventory listing from the cluster controller.
    pub async fn inventory(&self, inventory: Inventory) -> Result<Value> {
        let url = self.endpoints.inventory(inventory);
        Ok(self.executor.get(&url).await?.unwrap_or(Value::Array(vec![])))
    }

    /// Current routing table. Always re-fetched.
    pub async fn routes(&self) -> Result<Vec<CollectionRoute>> {
        let url = self.endpoints.inventory(Inventory::Routes);
        match self.executor.get(&url).await? {
            Some(body) => decode(&url, body),
            None => Ok(Vec::new()),
        }
    }

    pub async fn volumes(&self) -> Result<Vec<VolumeInfo>> {
        let url = self.endpoints.inventory(Inventory::Volumes);
        match self.executor.get(&url).await? {
            Some(body) => decode(&url, body),
            None => Ok(Vec::new()),
        }
    }
}

/// Decode a response body into a typed record.
pub(crate) fn decode<T: DeserializeOwned>(url: &str, body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| ClusterError::UnexpectedResponse {
        url: url.to_string(),
        detail: e.to_string(),
    })
}

/// Pretty-print a JSON value into the debug log.
pub fn dump_json(value: &Value) {
    debug!("**************************************************************************");
    if value.is_null() {
        debug!("Nothing to dump... Empty JSON");
    } else {
        match serde_json::to_string_pretty(value) {
            Ok(pretty) => debug!("{pretty}"),
            Err(e) => debug!("Failed to format JSON: {e}"),
        }
    }
    debug!("**************************************************************************");
}
