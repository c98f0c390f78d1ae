//! Random collection loading against a mock cluster.

use cluster_client::testing::{MockCluster, MockRule};
use cluster_client::{
    ClientConfig, ClusterClient, ClusterError, CollectionLoader, PartitionRouter, RetryPolicy,
};
use serde_json::json;
use std::time::Duration;

fn loader(base_url: String) -> CollectionLoader {
    let config = ClientConfig::new(base_url).with_retry(
        RetryPolicy::default()
            .with_attempts(1)
            .with_backoff(Duration::ZERO)
            .with_timeout(Duration::from_secs(5)),
    );
    let router = PartitionRouter::new(ClusterClient::new(&config).unwrap());
    CollectionLoader::new(router).with_span(tracing::info_span!("loader"))
}

fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("c{i}")).collect()
}

fn routes(n: usize) -> serde_json::Value {
    json!((0..n)
        .map(|i| json!({"collectionName": format!("c{i}"), "ingressServerId": "s0", "cores": []}))
        .collect::<Vec<_>>())
}

#[tokio::test]
async fn test_count_above_universe_fails_without_requests() {
    let mock = MockCluster::start().await.unwrap();

    let err = loader(mock.base_url())
        .random_load_from(&names(4), 5, false, true)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClusterError::InsufficientCollections {
            requested: 5,
            available: 4
        }
    ));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_random_load_fetches_routes_then_validates() {
    let mock = MockCluster::start().await.unwrap();
    mock.with_routes(routes(2));

    let err = loader(mock.base_url())
        .random_load(3, false, false)
        .await
        .unwrap_err();

    assert!(matches!(err, ClusterError::InsufficientCollections { .. }));
    assert_eq!(mock.count("/dkubectrlr/routes"), 1);
    assert_eq!(mock.count("/admin/ping"), 0);
}

#[tokio::test]
async fn test_sequential_skips_failures() {
    let mock = MockCluster::start().await.unwrap();
    mock.with_routes(routes(4));
    mock.on(MockRule::new("/solr/c1/admin/ping").status(503));

    let loaded = loader(mock.base_url())
        .random_load(4, false, false)
        .await
        .unwrap();

    assert_eq!(loaded.len(), 3);
    assert!(!loaded.contains(&"c1".to_string()));
    assert_eq!(mock.count("/admin/ping"), 4);
}

#[tokio::test]
async fn test_parallel_reports_successes_and_pings_each_once() {
    let mock = MockCluster::start().await.unwrap();
    mock.on(MockRule::new("/solr/c2/admin/ping").json(json!({"responseHeader": {"status": 1}})));
    mock.on(MockRule::new("/admin/ping")
        .json(json!({"responseHeader": {"status": 0}}))
        .delay(Duration::from_millis(50)));

    let universe = names(6);
    let loaded = loader(mock.base_url())
        .random_load_from(&universe, 6, true, true)
        .await
        .unwrap();

    assert_eq!(loaded.len(), 5);
    assert!(!loaded.contains(&"c2".to_string()));
    for name in &universe {
        assert_eq!(mock.count(&format!("/solr/{name}/admin/ping")), 1);
    }
    // Searches only follow successful pings.
    assert_eq!(mock.count("/select"), 5);
}

#[tokio::test]
async fn test_sample_is_distinct() {
    let mock = MockCluster::start().await.unwrap();

    let loaded = loader(mock.base_url())
        .random_load_from(&names(10), 5, false, false)
        .await
        .unwrap();

    let mut unique = loaded.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 5);
}
