#![allow(dead_code)]
use ddns_application::services::{DdnsState, RuntimeCounters};
use ddns_application::use_cases::{ApplyRegistrationUseCase, ResolveDnsQueryUseCase};
use ddns_domain::config::SoaConfig;
use ddns_domain::{HostEntry, HostMode};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub const SHARED_KEY: &str = "integration-test-key";

pub fn loopback() -> SocketAddr {
    "127.0.0.1:0".parse().unwrap()
}

pub fn entry(host: &str, mode: HostMode, target: &str, ttl: Option<u32>) -> HostEntry {
    HostEntry::new(host, mode, target, ttl, false).unwrap()
}

pub fn nat_entry(host: &str, target: &str) -> HostEntry {
    HostEntry::new(host, HostMode::Address, target, Some(30), true).unwrap()
}

pub fn state_with(static_entries: Vec<HostEntry>, name_servers: Vec<HostEntry>) -> Arc<DdnsState> {
    Arc::new(DdnsState::new(static_entries, name_servers, Vec::new()))
}

pub fn counters_of(state: &DdnsState) -> Arc<RuntimeCounters> {
    Arc::clone(state.counters())
}

pub fn apply_use_case(state: &Arc<DdnsState>) -> Arc<ApplyRegistrationUseCase> {
    Arc::new(ApplyRegistrationUseCase::new(
        Arc::clone(state),
        Duration::from_secs(900),
        Duration::from_secs(60),
    ))
}

pub fn resolve_use_case(state: &Arc<DdnsState>) -> Arc<ResolveDnsQueryUseCase> {
    Arc::new(ResolveDnsQueryUseCase::new(
        Arc::clone(state),
        5,
        SoaConfig::default(),
    ))
}

pub fn query_bytes(id: u16, name: &str, qtype: RecordType) -> Vec<u8> {
    let mut query = Query::new();
    query.set_name(Name::from_ascii(name).unwrap());
    query.set_query_type(qtype);
    query.set_query_class(DNSClass::IN);

    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);

    let mut buf = Vec::new();
    let mut encoder = BinEncoder::new(&mut buf);
    message.emit(&mut encoder).unwrap();
    buf
}
