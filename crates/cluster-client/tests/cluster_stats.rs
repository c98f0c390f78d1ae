//! Stats aggregation over mock inventories.

use cluster_client::testing::MockCluster;
use cluster_client::{ClientConfig, ClusterClient, StatsAggregator};
use serde_json::json;

#[tokio::test]
async fn test_cluster_stats_from_inventories() {
    let mock = MockCluster::start().await.unwrap();
    mock.with_routes(json!([
        {"collectionName": "a", "ingressServerId": "s0", "cores": [
            {"name": "a_shards_0", "size": "1048576", "docs": "1200", "serverId": "s0"},
            {"name": "a_shards_1", "size": 1048576, "docs": 800, "serverId": "s1"}
        ]},
        {"collectionName": "b", "ingressServerId": " ", "cores": [
            {"name": "b_shards_0", "size": 10, "docs": 3, "serverId": "s1"}
        ]}
    ]));
    mock.on(cluster_client::testing::MockRule::new("/dkubectrlr/volumes").json(json!([
        {"name": "pvc-0", "capacity": 1073741824, "used": 536870912, "cores": ["a_shards_0"]},
        {"name": "pvc-1", "capacity": 1073741824, "used": 0, "cores": ["a_shards_1", "b_shards_0"]}
    ])));

    let client = ClusterClient::new(&ClientConfig::new(mock.base_url())).unwrap();
    let aggregator = StatsAggregator::new(client).with_span(tracing::info_span!("stats"));

    let stats = aggregator.cluster_stats().await.unwrap();
    assert_eq!(stats.total_volumes, 2);
    assert_eq!(stats.total_capacity_bytes, 2 * 1073741824);
    assert_eq!(stats.total_used_bytes, 536870912);
    assert_eq!(stats.total_cores_in_volumes, 3);
    assert_eq!(stats.total_docs, 2003);

    let summary = stats.summary();
    assert_eq!(summary.total_capacity, "2.0 GB");
    assert_eq!(summary.total_used, "512.0 MB");
    assert_eq!(summary.total_docs, "2.0K");
    assert_eq!(summary.per_volume["pvc-1"].cores, 2);

    let loaded = aggregator.loaded_collection_stats(true).await.unwrap();
    assert_eq!(loaded.len(), 1);
    let a = &loaded["a"];
    assert_eq!(a.total_cores, 2);
    assert_eq!(a.core_servers, ["s0", "s1"]);
    assert_eq!(a.total_size_str, "2.0 MB");
}

#[tokio::test]
async fn test_empty_inventories() {
    let mock = MockCluster::start().await.unwrap();
    let client = ClusterClient::new(&ClientConfig::new(mock.base_url())).unwrap();

    let stats = StatsAggregator::new(client).cluster_stats().await.unwrap();

    assert_eq!(stats.total_volumes, 0);
    assert_eq!(stats.summary().total_docs, "0.0 ");
    assert_eq!(mock.count("/dkubectrlr/volumes"), 1);
    assert_eq!(mock.count("/dkubectrlr/routes"), 1);
}
