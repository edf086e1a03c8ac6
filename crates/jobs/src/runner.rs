use crate::{AddressCacheJob, ClusterSyncJob, HostMapSyncJob};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub trait SpawnableJob: Send + Sync + 'static {
    const NAME: &'static str;
    fn with_cancellation(self, token: CancellationToken) -> Self;
    fn start_job(self: Arc<Self>) -> JoinHandle<()>;
}

macro_rules! impl_spawnable_job {
    ($t:ty, $name:literal) => {
        impl SpawnableJob for $t {
            const NAME: &'static str = $name;

            fn with_cancellation(self, token: CancellationToken) -> Self {
                self.with_cancellation(token)
            }

            fn start_job(self: Arc<Self>) -> JoinHandle<()> {
                tokio::spawn(async move { self.start().await })
            }
        }
    };
}

impl_spawnable_job!(HostMapSyncJob, "host_map_sync");
impl_spawnable_job!(ClusterSyncJob, "cluster_sync");
impl_spawnable_job!(AddressCacheJob, "address_cache");

fn spawn_job<J: SpawnableJob>(
    job: Option<J>,
    shutdown: &Option<CancellationToken>,
    handles: &mut Vec<(&'static str, JoinHandle<()>)>,
) {
    if let Some(job) = job {
        let job = match shutdown {
            Some(token) => job.with_cancellation(token.clone()),
            None => job,
        };
        handles.push((J::NAME, Arc::new(job).start_job()));
    }
}

/// Handles of the spawned jobs, for a bounded join on shutdown.
pub struct RunningJobs {
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl RunningJobs {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.handles.iter().map(|(name, _)| *name).collect()
    }

    /// Waits up to `timeout` per job and aborts any job still running.
    ///
    /// Returns the number of jobs that had to be aborted.
    pub async fn join(self, timeout: Duration) -> usize {
        let mut aborted = 0;
        for (name, mut handle) in self.handles {
            match tokio::time::timeout(timeout, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(job = name, error = %e, "Background job ended abnormally"),
                Err(_) => {
                    warn!(job = name, timeout_secs = timeout.as_secs(), "Background job did not stop in time, aborting");
                    handle.abort();
                    aborted += 1;
                }
            }
        }
        aborted
    }
}

pub struct JobRunner {
    host_map_sync: Option<HostMapSyncJob>,
    cluster_sync: Option<ClusterSyncJob>,
    address_cache: Option<AddressCacheJob>,
    shutdown: Option<CancellationToken>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            host_map_sync: None,
            cluster_sync: None,
            address_cache: None,
            shutdown: None,
        }
    }

    pub fn with_host_map_sync(mut self, job: HostMapSyncJob) -> Self {
        self.host_map_sync = Some(job);
        self
    }

    pub fn with_cluster_sync(mut self, job: ClusterSyncJob) -> Self {
        self.cluster_sync = Some(job);
        self
    }

    pub fn with_address_cache(mut self, job: AddressCacheJob) -> Self {
        self.address_cache = Some(job);
        self
    }

    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    pub fn start(self) -> RunningJobs {
        info!("Starting background job runner");

        let mut handles = Vec::new();
        spawn_job(self.host_map_sync, &self.shutdown, &mut handles);
        spawn_job(self.cluster_sync, &self.shutdown, &mut handles);
        spawn_job(self.address_cache, &self.shutdown, &mut handles);

        info!(jobs = handles.len(), "All background jobs started");
        RunningJobs { handles }
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}
