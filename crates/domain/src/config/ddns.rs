use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::address_cache::AddressCacheEntry;
use crate::errors::DomainError;
use crate::host_entry::HostEntry;

/// Where dynamic entries come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DdnsMode {
    /// UDP registrations only. The scheduler rebuilds on its own timer.
    #[default]
    Udp,
    /// Cluster-replicated entries only.
    Cluster,
    Both,
}

impl DdnsMode {
    pub fn uses_udp(self) -> bool {
        matches!(self, DdnsMode::Udp | DdnsMode::Both)
    }

    pub fn uses_cluster(self) -> bool {
        matches!(self, DdnsMode::Cluster | DdnsMode::Both)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DdnsMode::Udp => "udp",
            DdnsMode::Cluster => "cluster",
            DdnsMode::Both => "both",
        }
    }
}

impl fmt::Display for DdnsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DdnsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "udp" => Ok(DdnsMode::Udp),
            "cluster" => Ok(DdnsMode::Cluster),
            "both" => Ok(DdnsMode::Both),
            _ => Err(format!("Unknown ddns mode: {}", s)),
        }
    }
}

/// Result of parsing a list of configuration lines. Bad lines are kept
/// beside the good ones so the caller can log them and carry on.
#[derive(Debug, Clone)]
pub struct ParsedLines<T> {
    pub valid: Vec<T>,
    pub rejected: Vec<(String, DomainError)>,
}

impl<T> ParsedLines<T> {
    fn collect<F>(lines: &[String], mut parse: F) -> Self
    where
        F: FnMut(&str) -> Result<T, DomainError>,
    {
        let mut valid = Vec::with_capacity(lines.len());
        let mut rejected = Vec::new();
        for line in lines.iter().filter(|l| !l.trim().is_empty()) {
            match parse(line) {
                Ok(item) => valid.push(item),
                Err(e) => rejected.push((line.clone(), e)),
            }
        }
        Self { valid, rejected }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DdnsConfig {
    #[serde(default)]
    pub mode: DdnsMode,

    #[serde(default = "default_udp_binding")]
    pub udp_binding: String,

    /// Pre-shared registration key. Required whenever UDP is in use.
    #[serde(default)]
    pub shared_key: Option<String>,

    /// Replay window for registration timestamps.
    #[serde(default = "default_message_ttl")]
    pub message_ttl_secs: u64,

    /// TTL used when no matching entry declares one.
    #[serde(default = "default_response_ttl")]
    pub response_ttl_secs: u32,

    /// Lifespan of a UDP registration that is not renewed.
    #[serde(default = "default_registration_ttl")]
    pub registration_ttl_secs: u64,

    #[serde(default = "default_bk_interval")]
    pub bk_interval_secs: u64,

    #[serde(default = "default_resync_interval")]
    pub resync_interval_secs: u64,

    #[serde(default)]
    pub log_unresolved: bool,

    /// `name,target[,ttl[,mode[,NAT]]]`
    #[serde(default)]
    pub hosts: Vec<String>,

    /// Same syntax as `hosts`, address mode only.
    #[serde(default)]
    pub name_servers: Vec<String>,

    /// `host[,minTTL]`
    #[serde(default)]
    pub address_cache: Vec<String>,
}

impl Default for DdnsConfig {
    fn default() -> Self {
        Self {
            mode: DdnsMode::default(),
            udp_binding: default_udp_binding(),
            shared_key: None,
            message_ttl_secs: default_message_ttl(),
            response_ttl_secs: default_response_ttl(),
            registration_ttl_secs: default_registration_ttl(),
            bk_interval_secs: default_bk_interval(),
            resync_interval_secs: default_resync_interval(),
            log_unresolved: false,
            hosts: vec![],
            name_servers: vec![],
            address_cache: vec![],
        }
    }
}

impl DdnsConfig {
    pub fn message_ttl(&self) -> Duration {
        Duration::from_secs(self.message_ttl_secs)
    }

    pub fn registration_ttl(&self) -> Duration {
        Duration::from_secs(self.registration_ttl_secs)
    }

    pub fn bk_interval(&self) -> Duration {
        Duration::from_secs(self.bk_interval_secs)
    }

    pub fn resync_interval(&self) -> Duration {
        Duration::from_secs(self.resync_interval_secs)
    }

    pub fn parse_hosts(&self) -> ParsedLines<HostEntry> {
        ParsedLines::collect(&self.hosts, HostEntry::parse_line)
    }

    pub fn parse_name_servers(&self) -> ParsedLines<HostEntry> {
        ParsedLines::collect(&self.name_servers, |line| {
            let entry = HostEntry::parse_line(line)?;
            if entry.address().is_none() {
                return Err(DomainError::NameServerNotAddress(line.trim().to_string()));
            }
            Ok(entry)
        })
    }

    pub fn parse_address_cache(&self, now: Instant) -> ParsedLines<AddressCacheEntry> {
        ParsedLines::collect(&self.address_cache, |line| {
            AddressCacheEntry::parse_line(line, now)
        })
    }
}

fn default_udp_binding() -> String {
    "0.0.0.0:1053".to_string()
}

fn default_message_ttl() -> u64 {
    900
}

fn default_response_ttl() -> u32 {
    5
}

fn default_registration_ttl() -> u64 {
    60
}

fn default_bk_interval() -> u64 {
    1
}

fn default_resync_interval() -> u64 {
    60
}
