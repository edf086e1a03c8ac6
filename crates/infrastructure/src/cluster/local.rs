use async_trait::async_trait;
use ddns_application::ports::{ClusterEvent, ClusterMembership};
use ddns_domain::{ClusterMember, ClusterStatus, DomainError, HostEntry};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const EVENT_CHANNEL_CAPACITY: usize = 64;

struct MembershipState {
    started: bool,
    members: BTreeMap<String, ClusterMember>,
    shutdown: Option<CancellationToken>,
}

/// Single-process membership: the local node elects itself leader on start
/// and receives master-task callbacks every `task_interval`.
///
/// Other members can be published in-process, which is how the binary's
/// own published hosts and tests feed the replicated snapshot.
pub struct LocalClusterMembership {
    node_id: String,
    task_interval: Duration,
    state: Mutex<MembershipState>,
    events: broadcast::Sender<ClusterEvent>,
}

impl LocalClusterMembership {
    pub fn new(node_id: impl Into<String>, task_interval: Duration) -> Arc<Self> {
        let node_id = node_id.into();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let mut members = BTreeMap::new();
        members.insert(node_id.clone(), ClusterMember::new(node_id.clone()));
        Arc::new(Self {
            node_id,
            task_interval,
            state: Mutex::new(MembershipState {
                started: false,
                members,
                shutdown: None,
            }),
            events,
        })
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Replaces the local node's published host entries.
    pub fn publish_hosts(&self, entries: &[HostEntry]) {
        let mut member = ClusterMember::new(self.node_id.clone());
        for (index, entry) in (0u32..).zip(entries) {
            member.publish_host(entry, index);
        }
        self.publish_member(member);
    }

    /// Adds or replaces a member and its properties.
    pub fn publish_member(&self, member: ClusterMember) {
        let status = {
            let mut state = self.lock();
            state.members.insert(member.id.clone(), member);
            self.snapshot(&state)
        };
        self.notify(status);
    }

    pub fn remove_member(&self, id: &str) -> bool {
        if id == self.node_id {
            return false;
        }
        let status = {
            let mut state = self.lock();
            if state.members.remove(id).is_none() {
                return false;
            }
            self.snapshot(&state)
        };
        self.notify(status);
        true
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MembershipState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self, state: &MembershipState) -> Option<ClusterStatus> {
        if !state.started {
            return None;
        }
        Some(ClusterStatus::new(
            Some(self.node_id.clone()),
            state.members.values().cloned().collect(),
        ))
    }

    fn notify(&self, status: Option<ClusterStatus>) {
        if let Some(status) = status {
            // No receivers is fine; the next subscriber reads `status()`.
            let _ = self.events.send(ClusterEvent::StatusChanged(status));
        }
    }
}

#[async_trait]
impl ClusterMembership for LocalClusterMembership {
    async fn start(&self) -> Result<(), DomainError> {
        let shutdown = CancellationToken::new();
        let status = {
            let mut state = self.lock();
            if state.started {
                return Ok(());
            }
            state.started = true;
            state.shutdown = Some(shutdown.clone());
            self.snapshot(&state)
        };

        info!(node = %self.node_id, "Cluster membership started, local node is leader");
        self.notify(status);

        let events = self.events.clone();
        let task_interval = self.task_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(task_interval);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let _ = events.send(ClusterEvent::MasterTask);
                    }
                    _ = shutdown.cancelled() => {
                        debug!("Cluster master task loop stopped");
                        break;
                    }
                }
            }
        });

        Ok(())
    }

    async fn stop(&self) -> Result<(), DomainError> {
        let shutdown = {
            let mut state = self.lock();
            state.started = false;
            state.shutdown.take()
        };
        if let Some(token) = shutdown {
            token.cancel();
            info!(node = %self.node_id, "Cluster membership stopped");
        }
        Ok(())
    }

    fn status(&self) -> Option<ClusterStatus> {
        let state = self.lock();
        self.snapshot(&state)
    }

    fn subscribe(&self) -> broadcast::Receiver<ClusterEvent> {
        self.events.subscribe()
    }
}
