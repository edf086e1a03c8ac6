use ddns_application::services::RuntimeCounters;
use ddns_application::use_cases::SyncHostMapUseCase;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const DEFAULT_BK_INTERVAL_SECS: u64 = 1;
const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 60;

/// Background scheduler: purges expired UDP registrations every
/// `bk_interval` and forces a full rebuild every `resync_interval`.
pub struct HostMapSyncJob {
    sync: Arc<SyncHostMapUseCase>,
    counters: Arc<RuntimeCounters>,
    bk_interval: Duration,
    resync_interval: Duration,
    shutdown: CancellationToken,
}

impl HostMapSyncJob {
    pub fn new(sync: Arc<SyncHostMapUseCase>, counters: Arc<RuntimeCounters>) -> Self {
        Self {
            sync,
            counters,
            bk_interval: Duration::from_secs(DEFAULT_BK_INTERVAL_SECS),
            resync_interval: Duration::from_secs(DEFAULT_RESYNC_INTERVAL_SECS),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_intervals(mut self, bk_interval: Duration, resync_interval: Duration) -> Self {
        self.bk_interval = bk_interval;
        self.resync_interval = resync_interval;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            bk_interval_ms = self.bk_interval.as_millis() as u64,
            resync_interval_secs = self.resync_interval.as_secs(),
            "Starting host map sync job"
        );

        let mut tick = tokio::time::interval(self.bk_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut resync = tokio::time::interval(self.resync_interval);
        resync.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of an interval completes immediately.
        resync.tick().await;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("HostMapSyncJob: shutting down");
                    break;
                }
                _ = tick.tick() => {
                    let outcome = self.sync.on_timer(false, Instant::now());
                    if outcome.purged > 0 || outcome.rebuilt {
                        debug!(
                            purged = outcome.purged,
                            rebuilt = outcome.rebuilt,
                            hosts = outcome.hosts,
                            "Host map sync tick"
                        );
                    }
                }
                _ = resync.tick() => {
                    let outcome = self.sync.on_timer(true, Instant::now());
                    let counters = self.counters.snapshot();
                    debug!(
                        hosts = outcome.hosts,
                        packets_received = counters.packets_received,
                        packets_rejected = counters.packets_rejected,
                        registrations = counters.registrations,
                        unregistrations = counters.unregistrations,
                        purged = counters.purged,
                        rebuilds = counters.rebuilds,
                        queries = counters.queries,
                        name_errors = counters.name_errors,
                        "Periodic host map resync"
                    );
                }
            }
        }
    }
}
