mod ddns_state;
mod host_map_builder;
mod registration_table;
mod runtime_counters;

pub use ddns_state::{AddressCachePolicy, DdnsState, RebuildOutcome};
pub use host_map_builder::HostMapBuilder;
pub use registration_table::{RegisterOutcome, RegistrationTable, UdpRegistration};
pub use runtime_counters::{CountersSnapshot, RuntimeCounters};
