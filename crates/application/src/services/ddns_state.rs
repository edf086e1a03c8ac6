use arc_swap::ArcSwap;
use ddns_domain::{AddressCacheEntry, ClusterStatus, DomainError, HostEntry, HostMap};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

use super::host_map_builder::HostMapBuilder;
use super::registration_table::{RegisterOutcome, RegistrationTable};
use super::runtime_counters::RuntimeCounters;
use crate::ports::AddressLookupResult;

/// Outcome of a host map rebuild.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RebuildOutcome {
    pub hosts: usize,
    pub entries: usize,
}

/// Scheduling knobs for the address cache.
#[derive(Debug, Clone, Copy)]
pub struct AddressCachePolicy {
    /// Added on top of `max(MinTTL, learned TTL)` after a success.
    pub slop: Duration,
    /// Delay before retrying a failed lookup.
    pub failure_backoff: Duration,
}

impl Default for AddressCachePolicy {
    fn default() -> Self {
        Self {
            slop: Duration::from_secs(2),
            failure_backoff: Duration::from_secs(300),
        }
    }
}

struct Tables {
    registrations: RegistrationTable,
    static_entries: Vec<HostEntry>,
    name_servers: Arc<[HostEntry]>,
    address_cache: HashMap<Arc<str>, AddressCacheEntry>,
    cluster_status: Option<ClusterStatus>,
}

/// Process-wide DDNS state.
///
/// Every table sits behind one mutex. The published [`HostMap`] is swapped
/// atomically under that lock and read without it.
pub struct DdnsState {
    tables: Mutex<Tables>,
    host_map: ArcSwap<HostMap>,
    counters: Arc<RuntimeCounters>,
}

impl DdnsState {
    pub fn new(
        static_entries: Vec<HostEntry>,
        name_servers: Vec<HostEntry>,
        address_cache: Vec<AddressCacheEntry>,
    ) -> Self {
        let address_cache = address_cache
            .into_iter()
            .map(|entry| (Arc::clone(&entry.host_name), entry))
            .collect();

        let state = Self {
            tables: Mutex::new(Tables {
                registrations: RegistrationTable::new(),
                static_entries,
                name_servers: Arc::from(name_servers),
                address_cache,
                cluster_status: None,
            }),
            host_map: ArcSwap::from_pointee(HostMap::empty()),
            counters: Arc::new(RuntimeCounters::new()),
        };
        state.rebuild(Instant::now());
        state
    }

    // Every critical section is a single table operation, so a panic while
    // holding the lock cannot leave a table half-written.
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn counters(&self) -> &Arc<RuntimeCounters> {
        &self.counters
    }

    // ── query path ───────────────────────────────────────────────────────────

    pub fn host_map(&self) -> Arc<HostMap> {
        self.host_map.load_full()
    }

    pub fn name_servers(&self) -> Arc<[HostEntry]> {
        Arc::clone(&self.tables().name_servers)
    }

    /// Last known addresses for `host`, if it is cached and has resolved at
    /// least once.
    pub fn cached_addresses(&self, host: &str) -> Option<Arc<[Ipv4Addr]>> {
        self.tables()
            .address_cache
            .get(host)
            .filter(|entry| entry.has_addresses())
            .map(|entry| Arc::clone(&entry.addresses))
    }

    // ── UDP registrations ────────────────────────────────────────────────────

    pub fn register(&self, key: String, entry: HostEntry, ttd: Instant) -> RegisterOutcome {
        self.tables().registrations.register(key, entry, ttd)
    }

    pub fn unregister(&self, key: &str) -> bool {
        self.tables().registrations.unregister(key)
    }

    pub fn purge_expired(&self, now: Instant) -> usize {
        let purged = self.tables().registrations.purge_expired(now);
        if purged > 0 {
            self.counters.add_purged(purged);
        }
        purged
    }

    pub fn is_dirty(&self) -> bool {
        self.tables().registrations.is_dirty()
    }

    pub fn registration_count(&self) -> usize {
        self.tables().registrations.len()
    }

    // ── host map ─────────────────────────────────────────────────────────────

    /// Rebuilds from static, cluster and live UDP entries and publishes the
    /// result. Clears the dirty flag.
    pub fn rebuild(&self, now: Instant) -> RebuildOutcome {
        let mut tables = self.tables();
        tables.registrations.take_dirty();

        let map = HostMapBuilder::rebuild(
            &tables.static_entries,
            tables.cluster_status.as_ref(),
            tables.registrations.live_entries(now),
        );
        let outcome = RebuildOutcome {
            hosts: map.len(),
            entries: map.entry_count(),
        };
        self.host_map.store(Arc::new(map));
        drop(tables);

        self.counters.rebuild();
        debug!(hosts = outcome.hosts, entries = outcome.entries, "Host map rebuilt");
        outcome
    }

    pub fn set_cluster_status(&self, status: Option<ClusterStatus>) {
        self.tables().cluster_status = status;
    }

    pub fn has_cluster_status(&self) -> bool {
        self.tables().cluster_status.is_some()
    }

    // ── address cache ────────────────────────────────────────────────────────

    pub fn address_cache_len(&self) -> usize {
        self.tables().address_cache.len()
    }

    pub fn due_address_cache_hosts(&self, now: Instant) -> Vec<Arc<str>> {
        self.tables()
            .address_cache
            .values()
            .filter(|entry| entry.is_due(now))
            .map(|entry| Arc::clone(&entry.host_name))
            .collect()
    }

    /// Stores a lookup result. Failures and empty answers keep the last known
    /// addresses and back off.
    pub fn complete_address_lookup(
        &self,
        host: &str,
        result: Result<AddressLookupResult, DomainError>,
        now: Instant,
        policy: &AddressCachePolicy,
    ) -> bool {
        let mut tables = self.tables();
        let Some(entry) = tables.address_cache.get_mut(host) else {
            return false;
        };

        match result {
            Ok(found) if !found.addresses.is_empty() => {
                entry.record_success(found.addresses, found.ttl, now, policy.slop);
                true
            }
            _ => {
                entry.record_failure(now, policy.failure_backoff);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddns_domain::HostMode;

    fn entry(host: &str, ip: &str) -> HostEntry {
        HostEntry::new(host, HostMode::Address, ip, None, false).unwrap()
    }

    #[test]
    fn test_static_entries_servable_at_startup() {
        let state = DdnsState::new(vec![entry("www.example.", "10.0.0.1")], vec![], vec![]);
        assert_eq!(state.host_map().get("www.example.").len(), 1);
    }

    #[test]
    fn test_registration_visible_after_rebuild() {
        let now = Instant::now();
        let state = DdnsState::new(vec![], vec![], vec![]);
        let e = entry("svc.example.", "10.0.0.5");

        state.register(e.canonical_key(), e, now + Duration::from_secs(60));
        assert!(state.host_map().get("svc.example.").is_empty());
        assert!(state.is_dirty());

        state.rebuild(now);
        assert_eq!(state.host_map().get("svc.example.").len(), 1);
        assert!(!state.is_dirty());
    }

    #[test]
    fn test_old_snapshot_survives_swap() {
        let now = Instant::now();
        let state = DdnsState::new(vec![], vec![], vec![]);
        let before = state.host_map();

        let e = entry("svc.example.", "10.0.0.5");
        state.register(e.canonical_key(), e, now + Duration::from_secs(60));
        state.rebuild(now);

        assert!(before.is_empty());
        assert!(!state.host_map().is_empty());
    }

    #[test]
    fn test_lookup_failure_keeps_addresses() {
        let now = Instant::now();
        let cache = AddressCacheEntry::new("backend.example.", 60, now).unwrap();
        let state = DdnsState::new(vec![], vec![], vec![cache]);
        let policy = AddressCachePolicy::default();

        let ok = AddressLookupResult {
            addresses: vec![Ipv4Addr::new(10, 1, 1, 1)],
            ttl: None,
        };
        assert!(state.complete_address_lookup("backend.example.", Ok(ok), now, &policy));
        assert!(state.due_address_cache_hosts(now).is_empty());

        let later = now + Duration::from_secs(62);
        assert_eq!(state.due_address_cache_hosts(later).len(), 1);
        let failed = Err(DomainError::QueryTimeout);
        assert!(!state.complete_address_lookup("backend.example.", failed, later, &policy));

        assert_eq!(
            state.cached_addresses("backend.example.").as_deref(),
            Some(&[Ipv4Addr::new(10, 1, 1, 1)][..])
        );
        assert!(state.due_address_cache_hosts(later + Duration::from_secs(299)).is_empty());
    }

    #[test]
    fn test_unresolved_cache_entry_has_no_addresses() {
        let now = Instant::now();
        let cache = AddressCacheEntry::new("backend.example.", 60, now).unwrap();
        let state = DdnsState::new(vec![], vec![], vec![cache]);
        assert!(state.cached_addresses("backend.example.").is_none());
        assert!(state.cached_addresses("unknown.example.").is_none());
    }
}
