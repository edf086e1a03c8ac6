use ddns_application::use_cases::RefreshAddressCacheUseCase;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const DEFAULT_INTERVAL_SECS: u64 = 1;

/// Address cache resolver loop. Each pass resolves whatever entries are due.
pub struct AddressCacheJob {
    refresh: Arc<RefreshAddressCacheUseCase>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl AddressCacheJob {
    pub fn new(refresh: Arc<RefreshAddressCacheUseCase>) -> Self {
        Self {
            refresh,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!("Starting address cache job");

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("AddressCacheJob: shutting down");
                    break;
                }
                _ = interval.tick() => {
                    let outcome = self.refresh.execute().await;
                    if outcome.candidates_found > 0 {
                        debug!(
                            candidates = outcome.candidates_found,
                            refreshed = outcome.refreshed,
                            failed = outcome.failed,
                            cache_size = outcome.cache_size,
                            "Address cache refresh cycle completed"
                        );
                    }
                }
            }
        }
    }
}
