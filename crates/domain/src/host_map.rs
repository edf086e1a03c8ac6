use std::collections::HashMap;
use std::sync::Arc;

use crate::host_entry::HostEntry;

/// Immutable snapshot of every servable binding, keyed by host name.
///
/// A new snapshot is built for every change and published by reference
/// swap, so readers never see a half-built map.
#[derive(Debug, Clone, Default)]
pub struct HostMap {
    entries: HashMap<Arc<str>, Vec<HostEntry>>,
    entry_count: usize,
}

impl HostMap {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Groups entries by host, keeping their relative order.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = HostEntry>,
    {
        let mut map: HashMap<Arc<str>, Vec<HostEntry>> = HashMap::new();
        let mut entry_count = 0;
        for entry in entries {
            entry_count += 1;
            map.entry(Arc::clone(&entry.host)).or_default().push(entry);
        }
        Self {
            entries: map,
            entry_count,
        }
    }

    /// Case-insensitive lookup. The trailing dot is optional.
    pub fn get(&self, name: &str) -> &[HostEntry] {
        let canonical = name.ends_with('.') && !name.bytes().any(|b| b.is_ascii_uppercase());
        let found = if canonical {
            self.entries.get(name)
        } else {
            let mut key = name.to_ascii_lowercase();
            if !key.ends_with('.') {
                key.push('.');
            }
            self.entries.get(key.as_str())
        };
        found.map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        !self.get(name).is_empty()
    }

    /// Number of distinct host names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| &**k)
    }
}
