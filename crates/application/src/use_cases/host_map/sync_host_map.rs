use ddns_domain::config::DdnsMode;
use ddns_domain::ClusterStatus;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::ports::ClusterEvent;
use crate::services::DdnsState;

/// Outcome of one scheduler pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HostMapSyncOutcome {
    pub purged: usize,
    pub rebuilt: bool,
    pub hosts: usize,
}

/// Purges expired UDP registrations and decides when to rebuild the map.
pub struct SyncHostMapUseCase {
    state: Arc<DdnsState>,
    mode: DdnsMode,
}

impl SyncHostMapUseCase {
    pub fn new(state: Arc<DdnsState>, mode: DdnsMode) -> Self {
        Self { state, mode }
    }

    /// Local timer tick. Without a cluster, a dirty table is rebuilt right
    /// away; `force` rebuilds unconditionally.
    pub fn on_timer(&self, force: bool, now: Instant) -> HostMapSyncOutcome {
        let purged = self.state.purge_expired(now);
        let dirty = self.state.is_dirty();
        let rebuild = force || (dirty && !self.mode.uses_cluster());
        self.finish(purged, rebuild, now)
    }

    /// Master or slave task callback from the membership service.
    pub fn on_cluster_task(&self, now: Instant) -> HostMapSyncOutcome {
        let purged = self.state.purge_expired(now);
        let rebuild = self.state.is_dirty();
        self.finish(purged, rebuild, now)
    }

    pub fn on_status_changed(&self, status: Option<ClusterStatus>, now: Instant) -> HostMapSyncOutcome {
        if let Some(status) = &status {
            info!(
                members = status.members.len(),
                leader = status.leader.as_deref().unwrap_or("-"),
                "Cluster status changed"
            );
        }
        self.state.set_cluster_status(status);
        self.finish(0, true, now)
    }

    pub fn on_cluster_event(&self, event: ClusterEvent, now: Instant) -> HostMapSyncOutcome {
        match event {
            ClusterEvent::StatusChanged(status) => self.on_status_changed(Some(status), now),
            ClusterEvent::MasterTask | ClusterEvent::SlaveTask => self.on_cluster_task(now),
        }
    }

    fn finish(&self, purged: usize, rebuild: bool, now: Instant) -> HostMapSyncOutcome {
        if !rebuild {
            return HostMapSyncOutcome {
                purged,
                rebuilt: false,
                hosts: self.state.host_map().len(),
            };
        }
        let rebuilt = self.state.rebuild(now);
        HostMapSyncOutcome {
            purged,
            rebuilt: true,
            hosts: rebuilt.hosts,
        }
    }
}
