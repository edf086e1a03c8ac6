use ddns_domain::HostEntry;
use std::collections::HashMap;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct UdpRegistration {
    pub entry: HostEntry,
    /// Time to die.
    pub ttd: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Inserted,
    /// Same entry, new deadline.
    Refreshed,
    /// Same key but TTL, NAT flag or NAT-rewritten target changed.
    Updated,
}

/// Soft-state table of UDP-sourced entries keyed by
/// [`HostEntry::canonical_key`] of the entry as it was registered.
#[derive(Debug, Default)]
pub struct RegistrationTable {
    rows: HashMap<String, UdpRegistration>,
    dirty: bool,
}

impl RegistrationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: String, entry: HostEntry, ttd: Instant) -> RegisterOutcome {
        match self.rows.get_mut(&key) {
            Some(row) => {
                row.ttd = ttd;
                if row.entry == entry {
                    RegisterOutcome::Refreshed
                } else {
                    row.entry = entry;
                    self.dirty = true;
                    RegisterOutcome::Updated
                }
            }
            None => {
                self.rows.insert(key, UdpRegistration { entry, ttd });
                self.dirty = true;
                RegisterOutcome::Inserted
            }
        }
    }

    /// Absent keys are not an error.
    pub fn unregister(&mut self, key: &str) -> bool {
        let removed = self.rows.remove(key).is_some();
        self.dirty |= removed;
        removed
    }

    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.rows.len();
        self.rows.retain(|_, row| row.ttd > now);
        let purged = before - self.rows.len();
        self.dirty |= purged > 0;
        purged
    }

    pub fn live_entries(&self, now: Instant) -> impl Iterator<Item = &HostEntry> {
        self.rows
            .values()
            .filter(move |row| row.ttd > now)
            .map(|row| &row.entry)
    }

    pub fn get(&self, key: &str) -> Option<&UdpRegistration> {
        self.rows.get(key)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
