#![allow(dead_code)]

use async_trait::async_trait;
use ddns_application::ports::{
    AddressLookup, AddressLookupResult, ClusterEvent, ClusterMembership,
};
use ddns_domain::{ClusterStatus, DomainError};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::broadcast;

#[derive(Clone, Default)]
pub struct MockAddressLookup {
    responses: Arc<RwLock<HashMap<String, Vec<Ipv4Addr>>>>,
    calls: Arc<AtomicU64>,
}

impl MockAddressLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_addresses(&self, host: &str, addresses: Vec<Ipv4Addr>) {
        self.responses
            .write()
            .unwrap()
            .insert(host.to_string(), addresses);
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AddressLookup for MockAddressLookup {
    async fn lookup(&self, host: &str) -> Result<AddressLookupResult, DomainError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match self.responses.read().unwrap().get(host) {
            Some(addresses) => Ok(AddressLookupResult {
                addresses: addresses.clone(),
                ttl: None,
            }),
            None => Err(DomainError::LookupFailed {
                host: host.to_string(),
                reason: "no mock response".to_string(),
            }),
        }
    }
}

/// Membership double driven by the test through `emit` and `set_status`.
pub struct MockClusterMembership {
    status: Mutex<Option<ClusterStatus>>,
    events: Mutex<Option<broadcast::Sender<ClusterEvent>>>,
}

impl MockClusterMembership {
    pub fn new(capacity: usize) -> Arc<Self> {
        let (sender, _) = broadcast::channel(capacity);
        Arc::new(Self {
            status: Mutex::new(None),
            events: Mutex::new(Some(sender)),
        })
    }

    pub fn set_status(&self, status: Option<ClusterStatus>) {
        *self.status.lock().unwrap() = status;
    }

    pub fn emit(&self, event: ClusterEvent) {
        if let Some(sender) = self.events.lock().unwrap().as_ref() {
            let _ = sender.send(event);
        }
    }

    pub fn receivers(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .as_ref()
            .map_or(0, |s| s.receiver_count())
    }

    /// Drops the sender so subscribers see `Closed`.
    pub fn close(&self) {
        self.events.lock().unwrap().take();
    }
}

#[async_trait]
impl ClusterMembership for MockClusterMembership {
    async fn start(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn stop(&self) -> Result<(), DomainError> {
        Ok(())
    }

    fn status(&self) -> Option<ClusterStatus> {
        self.status.lock().unwrap().clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<ClusterEvent> {
        match self.events.lock().unwrap().as_ref() {
            Some(sender) => sender.subscribe(),
            None => broadcast::channel(1).1,
        }
    }
}
