//! Typed records returned by the cluster controller and the search backend.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

/// Envelope every administrative call must return to count as successful.
pub fn success_envelope() -> Value {
    json!({
        "httpCode": 200,
        "errorCode": 0,
        "errorMsg": null,
        "response": true
    })
}

/// True when a decoded body is exactly the success envelope.
pub fn is_success_envelope(body: Option<&Value>) -> bool {
    body == Some(&success_envelope())
}

/// Routing entry for one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRoute {
    pub collection_name: String,
    #[serde(default)]
    pub ingress_server_id: String,
    #[serde(default)]
    pub cores: Vec<CoreInfo>,
}

impl CollectionRoute {
    /// A collection is loaded when it has an ingress server and at least one core.
    pub fn is_loaded(&self) -> bool {
        !self.ingress_server_id.trim().is_empty() && !self.cores.is_empty()
    }
}

/// One core (shard) registered under a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_value: Option<String>,
    #[serde(deserialize_with = "lenient_u64")]
    pub size: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub docs: u64,
    #[serde(default)]
    pub server_id: String,
}

/// Persistent volume backing one or more cores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeInfo {
    pub name: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub capacity: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub used: u64,
    pub cores: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResponseHeader {
    pub status: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultSet {
    #[serde(rename = "numFound")]
    pub num_found: i64,
    #[serde(default)]
    pub docs: Vec<Value>,
}

/// Body of select, ping, update and commit responses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "responseHeader")]
    pub response_header: Option<ResponseHeader>,
    pub response: Option<ResultSet>,
}

impl SearchResponse {
    pub fn status(&self) -> Option<i64> {
        self.response_header.as_ref().map(|h| h.status)
    }

    pub fn num_found(&self) -> Option<i64> {
        self.response.as_ref().map(|r| r.num_found)
    }
}

/// Counters may arrive as JSON numbers or numeric strings.
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_is_exact() {
        assert!(is_success_envelope(Some(&success_envelope())));
        let mut other = success_envelope();
        other["errorCode"] = json!(5);
        assert!(!is_success_envelope(Some(&other)));
        assert!(!is_success_envelope(None));
    }

    #[test]
    fn test_route_with_string_counters() {
        let route: CollectionRoute = serde_json::from_value(json!({
            "collectionName": "files",
            "ingressServerId": "solr-0",
            "cores": [
                {"name": "files_shards_0", "size": "2048", "docs": "10", "serverId": "solr-0"},
                {"name": "files_shards_1", "size": 1024, "docs": 5, "serverId": "solr-1"}
            ]
        }))
        .unwrap();
        assert_eq!(route.cores[0].size, 2048);
        assert_eq!(route.cores[1].docs, 5);
        assert!(route.is_loaded());
    }

    #[test]
    fn test_route_without_ingress_is_not_loaded() {
        let route: CollectionRoute = serde_json::from_value(json!({
            "collectionName": "files",
            "ingressServerId": "  ",
            "cores": [{"name": "c", "size": 1, "docs": 1}]
        }))
        .unwrap();
        assert!(!route.is_loaded());
    }

    #[test]
    fn test_volume_requires_all_fields() {
        let missing = serde_json::from_value::<VolumeInfo>(json!({"name": "pvc-0", "capacity": 10}));
        assert!(missing.is_err());
    }

    #[test]
    fn test_search_response() {
        let body: SearchResponse = serde_json::from_value(json!({
            "responseHeader": {"status": 0, "QTime": 1},
            "response": {"numFound": 42, "start": 0, "docs": []}
        }))
        .unwrap();
        assert_eq!(body.status(), Some(0));
        assert_eq!(body.num_found(), Some(42));
    }
}
