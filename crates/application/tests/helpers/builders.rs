#![allow(dead_code)]
use ddns_application::services::DdnsState;
use ddns_domain::{AddressCacheEntry, HostEntry, HostMode};
use std::sync::Arc;

pub fn entry(host: &str, mode: HostMode, target: &str, ttl: Option<u32>) -> HostEntry {
    HostEntry::new(host, mode, target, ttl, false).unwrap()
}

pub fn state_with(
    static_entries: Vec<HostEntry>,
    name_servers: Vec<HostEntry>,
    address_cache: Vec<AddressCacheEntry>,
) -> Arc<DdnsState> {
    Arc::new(DdnsState::new(static_entries, name_servers, address_cache))
}
