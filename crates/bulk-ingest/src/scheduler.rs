//! Periodic background commit.

use cluster_client::ClusterClient;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn, Instrument, Span};

/// Commits a collection every `interval` until stopped.
///
/// The first commit fires one full interval after start. A failed commit is
/// logged and the schedule continues.
pub struct CommitScheduler {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<u64>,
}

impl CommitScheduler {
    pub fn start(client: ClusterClient, collection: String, interval: Duration, span: Span) -> Self {
        let (cancel, mut cancelled) = watch::channel(false);
        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let handle = tokio::spawn(
            async move {
                info!("Starting commit scheduler with interval [{interval:?}]");
                let mut issued = 0u64;

                loop {
                    tokio::select! {
                        biased;
                        changed = cancelled.changed() => {
                            if changed.is_err() || *cancelled.borrow() {
                                break;
                            }
                        }
                        _ = ticker.tick() => {
                            issued += 1;
                            if let Err(e) = client.commit(&collection).await {
                                warn!("Scheduled commit failed for collection {collection}: {e}");
                            }
                        }
                    }
                }

                info!("Commit scheduler stopped after {issued} commits");
                issued
            }
            .instrument(span),
        );

        Self { cancel, handle }
    }

    /// Cancel the schedule and wait for an in-flight commit to finish.
    ///
    /// Returns the number of scheduled commits issued.
    pub async fn stop(self) -> u64 {
        // The task may already be gone; the join below reports that.
        let _ = self.cancel.send(true);
        match self.handle.await {
            Ok(issued) => issued,
            Err(e) => {
                warn!("Commit scheduler terminated abnormally: {e}");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluster_client::testing::MockCluster;
    use cluster_client::ClientConfig;

    fn client(mock: &MockCluster) -> ClusterClient {
        ClusterClient::new(&ClientConfig::new(mock.base_url())).unwrap()
    }

    #[tokio::test]
    async fn test_cancel_wins_over_due_tick() {
        let mock = MockCluster::start().await.unwrap();
        let scheduler = CommitScheduler::start(
            client(&mock),
            "files".to_string(),
            Duration::from_millis(1),
            Span::none(),
        );
        // The first tick falls due before the task is ever polled.
        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(scheduler.stop().await, 0);
        assert_eq!(mock.count("commit=true"), 0);
    }

    #[tokio::test]
    async fn test_no_commit_after_stop() {
        let mock = MockCluster::start().await.unwrap();
        let scheduler = CommitScheduler::start(
            client(&mock),
            "files".to_string(),
            Duration::from_millis(20),
            Span::none(),
        );
        tokio::time::sleep(Duration::from_millis(70)).await;

        let issued = scheduler.stop().await;
        assert!(issued >= 1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(mock.count("commit=true") as u64, issued);
    }
}
