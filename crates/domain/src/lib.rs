//! Dynamic DNS Domain Layer
pub mod address_cache;
pub mod cluster;
pub mod config;
pub mod dns_message;
pub mod dns_record;
pub mod errors;
pub mod host_entry;
pub mod host_map;
pub mod registration;

pub use address_cache::AddressCacheEntry;
pub use cluster::{ClusterMember, ClusterStatus};
pub use config::Config;
pub use dns_message::{AnswerRecord, DnsAnswer, DnsQuestion, RecordData, ResponseStatus, SoaData};
pub use dns_record::RecordType;
pub use errors::DomainError;
pub use host_entry::{HostEntry, HostMode, HostTarget};
pub use host_map::HostMap;
pub use registration::{RegistrationFlags, RegistrationMessage};
