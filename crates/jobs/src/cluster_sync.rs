use ddns_application::ports::ClusterMembership;
use ddns_application::use_cases::SyncHostMapUseCase;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Feeds membership events into the host map.
pub struct ClusterSyncJob {
    cluster: Arc<dyn ClusterMembership>,
    sync: Arc<SyncHostMapUseCase>,
    shutdown: CancellationToken,
}

impl ClusterSyncJob {
    pub fn new(cluster: Arc<dyn ClusterMembership>, sync: Arc<SyncHostMapUseCase>) -> Self {
        Self {
            cluster,
            sync,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!("Starting cluster sync job");

        let mut events = self.cluster.subscribe();
        if let Some(status) = self.cluster.status() {
            self.sync.on_status_changed(Some(status), Instant::now());
        }

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("ClusterSyncJob: shutting down");
                    break;
                }
                received = events.recv() => match received {
                    Ok(event) => {
                        let outcome = self.sync.on_cluster_event(event, Instant::now());
                        if outcome.rebuilt {
                            debug!(hosts = outcome.hosts, purged = outcome.purged, "Host map rebuilt from cluster event");
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Cluster events lagged, resyncing from status");
                        self.sync.on_status_changed(self.cluster.status(), Instant::now());
                    }
                    Err(RecvError::Closed) => {
                        info!("ClusterSyncJob: event channel closed");
                        break;
                    }
                },
            }
        }
    }
}
