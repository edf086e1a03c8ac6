use ddns_domain::{ClusterStatus, HostEntry, HostMap};
use std::collections::HashSet;
use tracing::debug;

/// Reconciles the three entry sources into one [`HostMap`].
///
/// Order per host: cluster-replicated entries (deduplicated across
/// members), then static configuration, then live UDP registrations.
pub struct HostMapBuilder;

impl HostMapBuilder {
    pub fn rebuild<'a, I>(
        static_entries: &[HostEntry],
        cluster: Option<&ClusterStatus>,
        udp_entries: I,
    ) -> HostMap
    where
        I: IntoIterator<Item = &'a HostEntry>,
    {
        let replicated = cluster.map(Self::cluster_entries).unwrap_or_default();

        HostMap::from_entries(
            replicated
                .into_iter()
                .chain(static_entries.iter().cloned())
                .chain(udp_entries.into_iter().cloned()),
        )
    }

    /// Parses every `host[<name>:<index>]` property of every member.
    /// Structurally equal entries published by several members collapse
    /// into one.
    pub fn cluster_entries(status: &ClusterStatus) -> Vec<HostEntry> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for member in &status.members {
            for (name, index, value) in member.host_properties() {
                match HostEntry::parse_fields(name, value) {
                    Ok(entry) => {
                        if seen.insert(entry.clone()) {
                            entries.push(entry);
                        }
                    }
                    Err(e) => {
                        debug!(
                            member = %member.id,
                            host = name,
                            index,
                            error = %e,
                            "Skipping unparseable cluster host property"
                        );
                    }
                }
            }
        }

        entries
    }
}
