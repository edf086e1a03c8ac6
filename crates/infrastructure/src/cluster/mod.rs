pub mod local;

pub use local::LocalClusterMembership;
