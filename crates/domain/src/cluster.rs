use std::collections::BTreeMap;

use crate::host_entry::HostEntry;

const HOST_KEY_PREFIX: &str = "host[";

/// One fleet member and the properties it replicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterMember {
    pub id: String,
    pub properties: BTreeMap<String, String>,
}

impl ClusterMember {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Publishes `entry` under `host[<name>:<index>]`.
    pub fn publish_host(&mut self, entry: &HostEntry, index: u32) {
        self.properties
            .insert(host_property_key(&entry.host, index), entry.to_property_value());
    }

    /// Properties shaped `host[<name>:<index>]`, as `(name, index, value)`.
    pub fn host_properties(&self) -> impl Iterator<Item = (&str, u32, &str)> {
        self.properties.iter().filter_map(|(key, value)| {
            parse_host_property_key(key).map(|(name, index)| (name, index, value.as_str()))
        })
    }
}

/// Replicated view of the fleet as reported by the membership service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterStatus {
    pub leader: Option<String>,
    pub members: Vec<ClusterMember>,
}

impl ClusterStatus {
    pub fn new(leader: Option<String>, members: Vec<ClusterMember>) -> Self {
        Self { leader, members }
    }
}

pub fn host_property_key(name: &str, index: u32) -> String {
    format!("{}{}:{}]", HOST_KEY_PREFIX, name, index)
}

/// Splits `host[<name>:<index>]` into its name and index.
pub fn parse_host_property_key(key: &str) -> Option<(&str, u32)> {
    let inner = key.strip_prefix(HOST_KEY_PREFIX)?.strip_suffix(']')?;
    let (name, index) = inner.rsplit_once(':')?;
    if name.is_empty() {
        return None;
    }
    Some((name, index.parse().ok()?))
}
