use async_trait::async_trait;
use ddns_domain::{ClusterStatus, DomainError};
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterEvent {
    /// The replicated snapshot changed.
    StatusChanged(ClusterStatus),
    /// Periodic callback while this node holds the master role.
    MasterTask,
    /// Periodic callback while this node is a follower.
    SlaveTask,
}

/// Fleet membership and property replication.
#[async_trait]
pub trait ClusterMembership: Send + Sync {
    async fn start(&self) -> Result<(), DomainError>;

    async fn stop(&self) -> Result<(), DomainError>;

    /// `None` until a leader has been elected.
    fn status(&self) -> Option<ClusterStatus>;

    fn subscribe(&self) -> broadcast::Receiver<ClusterEvent>;
}
