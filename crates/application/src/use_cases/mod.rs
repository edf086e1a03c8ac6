pub mod address_cache;
pub mod dns;
pub mod host_map;
pub mod registration;

pub use address_cache::{AddressCacheRefreshOutcome, RefreshAddressCacheUseCase};
pub use dns::ResolveDnsQueryUseCase;
pub use host_map::{HostMapSyncOutcome, SyncHostMapUseCase};
pub use registration::{ApplyRegistrationUseCase, RegistrationOutcome};
