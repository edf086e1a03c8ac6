use async_trait::async_trait;
use ddns_application::ports::{AddressLookup, AddressLookupResult};
use ddns_domain::DomainError;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tracing::debug;

/// Forward lookups through the host's resolver (`getaddrinfo`).
///
/// The platform API does not expose record TTLs, so `ttl` is always `None`.
pub struct PlatformAddressLookup {
    timeout: Duration,
}

impl PlatformAddressLookup {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for PlatformAddressLookup {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl AddressLookup for PlatformAddressLookup {
    async fn lookup(&self, host: &str) -> Result<AddressLookupResult, DomainError> {
        let name = host.trim_end_matches('.');

        let resolved = tokio::time::timeout(self.timeout, tokio::net::lookup_host((name, 0)))
            .await
            .map_err(|_| DomainError::QueryTimeout)?
            .map_err(|e| DomainError::LookupFailed {
                host: host.to_string(),
                reason: e.to_string(),
            })?;

        let mut addresses: Vec<Ipv4Addr> = Vec::new();
        for addr in resolved {
            if let IpAddr::V4(ip) = addr.ip() {
                if !addresses.contains(&ip) {
                    addresses.push(ip);
                }
            }
        }

        if addresses.is_empty() {
            return Err(DomainError::LookupFailed {
                host: host.to_string(),
                reason: "no IPv4 addresses".to_string(),
            });
        }

        debug!(host = %host, addresses = addresses.len(), "Platform lookup succeeded");
        Ok(AddressLookupResult {
            addresses,
            ttl: None,
        })
    }
}
