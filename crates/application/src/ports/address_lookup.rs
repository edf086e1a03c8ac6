use async_trait::async_trait;
use ddns_domain::DomainError;
use std::net::Ipv4Addr;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressLookupResult {
    pub addresses: Vec<Ipv4Addr>,
    /// Record TTL when the resolver reports one.
    pub ttl: Option<u32>,
}

/// Forward name resolution used by the address cache resolver.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn lookup(&self, host: &str) -> Result<AddressLookupResult, DomainError>;
}
