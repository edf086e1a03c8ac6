mod address_lookup;
mod cluster_membership;

pub use address_lookup::{AddressLookup, AddressLookupResult};
pub use cluster_membership::{ClusterEvent, ClusterMembership};
