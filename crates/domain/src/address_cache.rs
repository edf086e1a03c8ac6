use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::errors::DomainError;
use crate::host_entry::normalize_domain_name;

pub const DEFAULT_MIN_TTL_SECS: u32 = 60;

/// A host name the resolver keeps warm so CNAME answers can carry a
/// ready-made A record.
#[derive(Debug, Clone)]
pub struct AddressCacheEntry {
    pub host_name: Arc<str>,
    pub min_ttl: u32,
    /// Time to renew.
    pub ttr: Instant,
    /// Last known good addresses. Kept across failed lookups.
    pub addresses: Arc<[Ipv4Addr]>,
    pub learned_ttl: Option<u32>,
    pub consecutive_failures: u32,
}

impl AddressCacheEntry {
    /// New entries are due immediately.
    pub fn new(host_name: &str, min_ttl: u32, now: Instant) -> Result<Self, DomainError> {
        Ok(Self {
            host_name: normalize_domain_name(host_name)?,
            min_ttl,
            ttr: now,
            addresses: Arc::from(Vec::new()),
            learned_ttl: None,
            consecutive_failures: 0,
        })
    }

    /// Parses `host[,minTTL]`.
    pub fn parse_line(line: &str, now: Instant) -> Result<Self, DomainError> {
        let mut parts = line.split(',').map(str::trim);
        let host = parts.next().unwrap_or_default();
        let min_ttl = match parts.next() {
            Some(raw) if !raw.is_empty() => raw
                .parse::<u32>()
                .map_err(|_| DomainError::InvalidTtl(raw.to_string()))?,
            _ => DEFAULT_MIN_TTL_SECS,
        };
        if parts.next().is_some() {
            return Err(DomainError::InvalidAddressCacheLine(line.trim().to_string()));
        }
        Self::new(host, min_ttl, now)
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.ttr
    }

    /// `max(MinTTL, learned TTL)`.
    pub fn renewal_interval(&self) -> Duration {
        let secs = self.learned_ttl.map_or(self.min_ttl, |ttl| ttl.max(self.min_ttl));
        Duration::from_secs(u64::from(secs))
    }

    pub fn record_success(
        &mut self,
        addresses: Vec<Ipv4Addr>,
        learned_ttl: Option<u32>,
        now: Instant,
        slop: Duration,
    ) {
        self.addresses = Arc::from(addresses);
        self.learned_ttl = learned_ttl;
        self.consecutive_failures = 0;
        self.ttr = now + self.renewal_interval() + slop;
    }

    /// Addresses stay as they were; only the next attempt moves out.
    pub fn record_failure(&mut self, now: Instant, backoff: Duration) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.ttr = now + backoff;
    }

    pub fn has_addresses(&self) -> bool {
        !self.addresses.is_empty()
    }
}
