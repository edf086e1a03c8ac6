#![allow(dead_code)]

use async_trait::async_trait;
use ddns_application::ports::{AddressLookup, AddressLookupResult};
use ddns_domain::DomainError;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Clone, Default)]
pub struct MockAddressLookup {
    responses: Arc<RwLock<HashMap<String, Result<AddressLookupResult, DomainError>>>>,
    calls: Arc<AtomicU64>,
}

impl MockAddressLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_addresses(&self, host: &str, addresses: Vec<Ipv4Addr>) {
        self.responses.write().unwrap().insert(
            host.to_string(),
            Ok(AddressLookupResult {
                addresses,
                ttl: None,
            }),
        );
    }

    pub fn set_error(&self, host: &str, error: DomainError) {
        self.responses
            .write()
            .unwrap()
            .insert(host.to_string(), Err(error));
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AddressLookup for MockAddressLookup {
    async fn lookup(&self, host: &str) -> Result<AddressLookupResult, DomainError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.responses
            .read()
            .unwrap()
            .get(host)
            .cloned()
            .unwrap_or_else(|| {
                Err(DomainError::LookupFailed {
                    host: host.to_string(),
                    reason: "no mock response".to_string(),
                })
            })
    }
}
