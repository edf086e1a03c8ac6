pub mod address_cache;
pub mod cluster_sync;
pub mod host_map_sync;
pub mod runner;

pub use address_cache::AddressCacheJob;
pub use cluster_sync::ClusterSyncJob;
pub use host_map_sync::HostMapSyncJob;
pub use runner::{JobRunner, RunningJobs};
