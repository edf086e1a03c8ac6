#![allow(dead_code)]
use ddns_application::services::DdnsState;
use ddns_domain::{AddressCacheEntry, HostEntry, HostMode};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;

pub fn entry(host: &str, mode: HostMode, target: &str, ttl: Option<u32>) -> HostEntry {
    HostEntry::new(host, mode, target, ttl, false).unwrap()
}

pub fn empty_state() -> Arc<DdnsState> {
    Arc::new(DdnsState::new(Vec::new(), Vec::new(), Vec::new()))
}

pub fn state_with_cache(hosts: &[&str]) -> Arc<DdnsState> {
    let now = Instant::now();
    let cache = hosts
        .iter()
        .map(|h| AddressCacheEntry::new(h, 60, now).unwrap())
        .collect();
    Arc::new(DdnsState::new(Vec::new(), Vec::new(), cache))
}

/// Polls `condition` every 10 ms for up to two seconds.
pub async fn eventually<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        sleep(Duration::from_millis(10)).await;
    }
    condition()
}
