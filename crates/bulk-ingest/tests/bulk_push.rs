//! Bulk push against a mock cluster.

use bulk_ingest::{BulkIngestor, BulkPushOptions, IngestError};
use cluster_client::testing::{Method, MockCluster, MockRule, RecordedRequest};
use cluster_client::{ClientConfig, ClusterClient, ClusterError, RetryPolicy};
use document_generator::{ContentOptions, DocumentType};
use serde_json::json;
use std::time::Duration;
use tokio_test::assert_ok;

const COLLECTION: &str = "files";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .try_init();
}

fn ingestor(mock: &MockCluster) -> BulkIngestor {
    let config = ClientConfig::new(mock.base_url()).with_retry(
        RetryPolicy::default()
            .with_backoff(Duration::ZERO)
            .with_timeout(Duration::from_secs(5)),
    );
    BulkIngestor::new(ClusterClient::new(&config).unwrap())
        .with_span(tracing::info_span!("bulk_push", collection = COLLECTION))
}

fn options() -> BulkPushOptions {
    BulkPushOptions::default()
        .with_batch_size(10)
        .with_commit_interval(Duration::from_secs(3600))
        .with_push_retry(3, Duration::ZERO)
        .with_seed(42)
}

fn pushes(mock: &MockCluster) -> Vec<RecordedRequest> {
    mock.requests()
        .into_iter()
        .filter(|r| r.method == "POST" && r.target == format!("/solr/{COLLECTION}/update"))
        .collect()
}

fn pushed_docs(mock: &MockCluster) -> usize {
    pushes(mock)
        .iter()
        .map(|r| r.json().as_array().map(Vec::len).unwrap_or(0))
        .sum()
}

fn assert_final_commit_last(mock: &MockCluster) {
    let requests = mock.requests();
    let last = requests.last().unwrap();
    assert_eq!(last.target, format!("/solr/{COLLECTION}/update?commit=true"));
    let last_push = requests
        .iter()
        .filter(|r| r.method == "POST")
        .map(|r| r.received_at)
        .max();
    if let Some(last_push) = last_push {
        assert!(last.received_at >= last_push);
    }
}

#[tokio::test]
async fn test_remainder_is_dropped() {
    init_tracing();
    let mock = MockCluster::start().await.unwrap();

    let report = assert_ok!(
        ingestor(&mock)
            .bulk_push(COLLECTION, 100, DocumentType::File, options().with_workers(3))
            .await
    );

    assert_eq!(report.workers, 3);
    assert_eq!(report.per_worker, 33);
    assert_eq!(report.pushed, 99);
    assert_eq!(report.dropped, 100 - 3 * (100 / 3));
    // 33 per worker in batches of 10, 10, 10, 3.
    assert_eq!(report.batches, 12);
    assert_eq!(pushes(&mock).len(), 12);
    assert_eq!(pushed_docs(&mock), 99);

    assert_eq!(mock.count("/admin/ping"), 1);
    assert_eq!(mock.count("commit=true"), 1);
    assert_final_commit_last(&mock);
}

#[tokio::test]
async fn test_batches_never_overshoot_share() {
    init_tracing();
    let mock = MockCluster::start().await.unwrap();

    ingestor(&mock)
        .bulk_push(COLLECTION, 25, DocumentType::File, options())
        .await
        .unwrap();

    let sizes: Vec<usize> = pushes(&mock)
        .iter()
        .map(|r| r.json().as_array().map(Vec::len).unwrap_or(0))
        .collect();
    assert_eq!(sizes, [10, 10, 5]);
    for push in pushes(&mock) {
        assert_eq!(
            push.content_type.as_deref(),
            Some("application/json; charset=UTF-8")
        );
    }
}

#[tokio::test]
async fn test_more_workers_than_documents_uses_one() {
    init_tracing();
    let mock = MockCluster::start().await.unwrap();

    let report = ingestor(&mock)
        .bulk_push(COLLECTION, 2, DocumentType::File, options().with_workers(5))
        .await
        .unwrap();

    assert_eq!(report.workers, 1);
    assert_eq!(report.pushed, 2);
    assert_eq!(report.dropped, 0);
}

#[tokio::test]
async fn test_zero_documents_still_pings_and_commits() {
    init_tracing();
    let mock = MockCluster::start().await.unwrap();

    let report = ingestor(&mock)
        .bulk_push(COLLECTION, 0, DocumentType::File, options().with_workers(4))
        .await
        .unwrap();

    assert_eq!(report.workers, 0);
    assert_eq!(report.pushed, 0);
    assert!(pushes(&mock).is_empty());
    assert_eq!(mock.count("/admin/ping"), 1);
    assert_eq!(mock.count("commit=true"), 1);
}

#[tokio::test]
async fn test_zero_batch_size_rejected_before_requests() {
    let mock = MockCluster::start().await.unwrap();

    let err = ingestor(&mock)
        .bulk_push(COLLECTION, 10, DocumentType::File, options().with_batch_size(0))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::InvalidOptions(_)));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_create_collection_precedes_ping_and_pushes() {
    init_tracing();
    let mock = MockCluster::start().await.unwrap();

    ingestor(&mock)
        .bulk_push(
            COLLECTION,
            5,
            DocumentType::File,
            options().with_create_collection(true).with_num_cores(4),
        )
        .await
        .unwrap();

    let targets: Vec<String> = mock.requests().into_iter().map(|r| r.target).collect();
    assert!(targets[..4].iter().all(|t| t.contains("type=CREATECORE")));
    assert_eq!(targets[4], format!("/solr/api/admin/cvroutes/update?cvCollection={COLLECTION}"));
    assert_eq!(targets[5], format!("/solr/{COLLECTION}/admin/ping"));
    assert_eq!(targets[6], format!("/solr/{COLLECTION}/update"));
}

#[tokio::test]
async fn test_failed_ping_starts_no_workers() {
    init_tracing();
    let mock = MockCluster::start().await.unwrap();
    mock.on(MockRule::new("/admin/ping").json(json!({"responseHeader": {"status": 2}})));

    let err = ingestor(&mock)
        .bulk_push(COLLECTION, 10, DocumentType::File, options())
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::Cluster(ClusterError::PingFailed { .. })));
    assert!(pushes(&mock).is_empty());
    assert_eq!(mock.count("commit=true"), 0);
}

#[tokio::test]
async fn test_rejected_push_fails_after_batch_retries() {
    init_tracing();
    let mock = MockCluster::start().await.unwrap();
    mock.on(MockRule::new(format!("/solr/{COLLECTION}/update"))
        .method(Method::POST)
        .json(json!({"responseHeader": {"status": 500}})));

    let err = ingestor(&mock)
        .bulk_push(
            COLLECTION,
            10,
            DocumentType::File,
            options().with_push_retry(2, Duration::ZERO),
        )
        .await
        .unwrap_err();

    match err {
        IngestError::PushFailed {
            collection,
            attempts,
            source,
        } => {
            assert_eq!(collection, COLLECTION);
            assert_eq!(attempts, 2);
            assert!(matches!(source, ClusterError::UpdateRejected { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(pushes(&mock).len(), 2);
    assert_eq!(mock.count("commit=true"), 1);
    assert_final_commit_last(&mock);
}

#[tokio::test]
async fn test_acknowledged_batches_committed_after_worker_failure() {
    init_tracing();
    let mock = MockCluster::start().await.unwrap();
    mock.on(MockRule::new(format!("/solr/{COLLECTION}/update"))
        .method(Method::POST)
        .json(json!({"responseHeader": {"status": 0}}))
        .times(1))
        .on(MockRule::new(format!("/solr/{COLLECTION}/update"))
            .method(Method::POST)
            .json(json!({"responseHeader": {"status": 500}})));

    let err = ingestor(&mock)
        .bulk_push(
            COLLECTION,
            20,
            DocumentType::File,
            options()
                .with_workers(2)
                .with_push_retry(1, Duration::ZERO),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::PushFailed { attempts: 1, .. }));
    assert_eq!(pushes(&mock).len(), 2);
    assert_eq!(mock.count("commit=true"), 1);
    assert_final_commit_last(&mock);
}

#[tokio::test]
async fn test_failed_final_commit_after_worker_failure_keeps_push_error() {
    init_tracing();
    let mock = MockCluster::start().await.unwrap();
    mock.on(MockRule::new(format!("/solr/{COLLECTION}/update"))
        .method(Method::POST)
        .json(json!({"responseHeader": {"status": 500}})))
        .on(MockRule::new("commit=true").json(json!({"responseHeader": {"status": 1}})));

    let err = ingestor(&mock)
        .bulk_push(
            COLLECTION,
            10,
            DocumentType::File,
            options().with_push_retry(1, Duration::ZERO),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::PushFailed { .. }));
    assert_eq!(mock.count("commit=true"), 1);
}

#[tokio::test]
async fn test_transient_push_failure_recovers() {
    init_tracing();
    let mock = MockCluster::start().await.unwrap();
    mock.on(MockRule::new(format!("/solr/{COLLECTION}/update"))
        .method(Method::POST)
        .json(json!({"responseHeader": {"status": 500}}))
        .times(1));

    let report = ingestor(&mock)
        .bulk_push(COLLECTION, 10, DocumentType::File, options())
        .await
        .unwrap();

    assert_eq!(report.pushed, 10);
    assert_eq!(pushes(&mock).len(), 2);
    assert_final_commit_last(&mock);
}

#[tokio::test]
async fn test_periodic_commits_run_during_push() {
    init_tracing();
    let mock = MockCluster::start().await.unwrap();
    mock.on(MockRule::new(format!("/solr/{COLLECTION}/update"))
        .method(Method::POST)
        .json(json!({"responseHeader": {"status": 0}}))
        .delay(Duration::from_millis(40)));

    let report = ingestor(&mock)
        .bulk_push(
            COLLECTION,
            50,
            DocumentType::File,
            options().with_commit_interval(Duration::from_millis(50)),
        )
        .await
        .unwrap();

    assert!(report.periodic_commits >= 1);
    assert_eq!(
        mock.count("commit=true") as u64,
        report.periodic_commits + 1
    );
    assert_final_commit_last(&mock);
}

#[tokio::test]
async fn test_content_and_extra_fields_are_pushed() {
    init_tracing();
    let mock = MockCluster::start().await.unwrap();
    let extra = json!({"ClientId": 17}).as_object().cloned().unwrap();

    ingestor(&mock)
        .bulk_push(
            COLLECTION,
            3,
            DocumentType::File,
            options()
                .with_content(ContentOptions::small())
                .with_cache_refresh_batches(1)
                .with_batch_size(1)
                .with_extra_fields(extra),
        )
        .await
        .unwrap();

    let pushes = pushes(&mock);
    assert_eq!(pushes.len(), 3);
    for push in pushes {
        let doc = &push.json()[0];
        assert!(doc["content"].as_str().is_some_and(|c| !c.is_empty()));
        assert_eq!(doc["ContentIndexingStatus"], "1");
        assert_eq!(doc["ClientId"], 17);
    }
}
