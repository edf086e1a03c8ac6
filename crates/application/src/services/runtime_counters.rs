use std::sync::atomic::{AtomicU64, Ordering};

/// Liveness counters shared by the listener, scheduler and query path.
#[derive(Debug, Default)]
pub struct RuntimeCounters {
    packets_received: AtomicU64,
    packets_rejected: AtomicU64,
    registrations: AtomicU64,
    unregistrations: AtomicU64,
    purged: AtomicU64,
    rebuilds: AtomicU64,
    queries: AtomicU64,
    name_errors: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub packets_received: u64,
    pub packets_rejected: u64,
    pub registrations: u64,
    pub unregistrations: u64,
    pub purged: u64,
    pub rebuilds: u64,
    pub queries: u64,
    pub name_errors: u64,
}

impl RuntimeCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn packet_received(&self) {
        self.packets_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn packet_rejected(&self) {
        self.packets_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn registration(&self) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn unregistration(&self) {
        self.unregistrations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_purged(&self, count: usize) {
        self.purged.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn rebuild(&self) {
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn name_error(&self) {
        self.name_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            packets_received: self.packets_received.load(Ordering::Relaxed),
            packets_rejected: self.packets_rejected.load(Ordering::Relaxed),
            registrations: self.registrations.load(Ordering::Relaxed),
            unregistrations: self.unregistrations.load(Ordering::Relaxed),
            purged: self.purged.load(Ordering::Relaxed),
            rebuilds: self.rebuilds.load(Ordering::Relaxed),
            queries: self.queries.load(Ordering::Relaxed),
            name_errors: self.name_errors.load(Ordering::Relaxed),
        }
    }
}
