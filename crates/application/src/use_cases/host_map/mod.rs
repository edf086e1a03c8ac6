mod sync_host_map;

pub use sync_host_map::{HostMapSyncOutcome, SyncHostMapUseCase};
