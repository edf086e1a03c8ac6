#![allow(dead_code)]
use ddns_domain::{HostEntry, HostMode};

pub struct HostEntryBuilder {
    host: String,
    mode: HostMode,
    target: String,
    ttl: Option<u32>,
    is_nat: bool,
}

impl HostEntryBuilder {
    pub fn new() -> Self {
        Self {
            host: "svc.example.com.".to_string(),
            mode: HostMode::Address,
            target: "10.0.0.1".to_string(),
            ttl: None,
            is_nat: false,
        }
    }

    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn mode(mut self, mode: HostMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn target(mut self, target: &str) -> Self {
        self.target = target.to_string();
        self
    }

    pub fn ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn nat(mut self) -> Self {
        self.is_nat = true;
        self
    }

    pub fn build(self) -> HostEntry {
        HostEntry::new(&self.host, self.mode, &self.target, self.ttl, self.is_nat).unwrap()
    }
}

impl Default for HostEntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
