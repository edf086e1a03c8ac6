use chrono::Utc;
use ddns_application::use_cases::{ApplyRegistrationUseCase, RegistrationOutcome};
use ddns_domain::{DomainError, HostEntry, HostMode, RegistrationMessage};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

mod helpers;
use helpers::{entry, state_with};

const MESSAGE_TTL: Duration = Duration::from_secs(900);
const REGISTRATION_TTL: Duration = Duration::from_secs(60);

fn source() -> SocketAddr {
    "198.51.100.7:40000".parse().unwrap()
}

fn setup() -> (Arc<ddns_application::services::DdnsState>, ApplyRegistrationUseCase) {
    let state = state_with(vec![], vec![], vec![]);
    let uc = ApplyRegistrationUseCase::new(Arc::clone(&state), MESSAGE_TTL, REGISTRATION_TTL);
    (state, uc)
}

fn svc() -> HostEntry {
    entry("svc.example.", HostMode::Address, "10.0.0.1", Some(30))
}

#[test]
fn test_register_then_refresh() {
    let (state, uc) = setup();
    let now = Utc::now();

    let first = uc.execute(RegistrationMessage::register(svc(), now), source()).unwrap();
    let second = uc.execute(RegistrationMessage::register(svc(), now), source()).unwrap();

    assert_eq!(first, RegistrationOutcome::Registered);
    assert_eq!(second, RegistrationOutcome::Refreshed);
    assert_eq!(state.registration_count(), 1);
    assert_eq!(state.counters().snapshot().registrations, 2);
}

#[test]
fn test_stale_message_is_rejected() {
    let (state, uc) = setup();
    let now = Utc::now();
    let old = now - chrono::Duration::seconds(901);

    let result = uc.execute_at(RegistrationMessage::register(svc(), old), source(), now, Instant::now());

    assert!(matches!(result, Err(DomainError::RegistrationExpired { skew_secs: 901 })));
    assert_eq!(state.registration_count(), 0);
    assert!(!state.is_dirty());
}

#[test]
fn test_future_message_is_rejected() {
    let (state, uc) = setup();
    let now = Utc::now();
    let ahead = now + chrono::Duration::seconds(901);

    let result = uc.execute_at(RegistrationMessage::register(svc(), ahead), source(), now, Instant::now());

    assert!(result.is_err());
    assert_eq!(state.registration_count(), 0);
}

#[test]
fn test_unregister_unknown_is_not_an_error() {
    let (state, uc) = setup();

    let outcome = uc
        .execute(RegistrationMessage::unregister(svc(), Utc::now()), source())
        .unwrap();

    assert_eq!(outcome, RegistrationOutcome::NotRegistered);
    assert_eq!(state.registration_count(), 0);
    assert!(!state.is_dirty());
}

#[test]
fn test_register_then_double_unregister_leaves_no_residue() {
    let (state, uc) = setup();
    let now = Utc::now();

    uc.execute(RegistrationMessage::register(svc(), now), source()).unwrap();
    let first = uc.execute(RegistrationMessage::unregister(svc(), now), source()).unwrap();
    let second = uc.execute(RegistrationMessage::unregister(svc(), now), source()).unwrap();

    assert_eq!(first, RegistrationOutcome::Unregistered);
    assert_eq!(second, RegistrationOutcome::NotRegistered);
    assert_eq!(state.registration_count(), 0);

    state.rebuild(Instant::now());
    assert!(state.host_map().get("svc.example.").is_empty());
}

#[test]
fn test_nat_registration_uses_source_address() {
    let (state, uc) = setup();
    let nat = HostEntry::new("home.example.", HostMode::Address, "192.168.1.10", None, true).unwrap();

    uc.execute(RegistrationMessage::register(nat.clone(), Utc::now()), source())
        .unwrap();
    state.rebuild(Instant::now());

    let map = state.host_map();
    let entries = map.get("home.example.");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].address(), Some(Ipv4Addr::new(198, 51, 100, 7)));

    // unregister by the payload as sent
    let outcome = uc
        .execute(RegistrationMessage::unregister(nat, Utc::now()), source())
        .unwrap();
    assert_eq!(outcome, RegistrationOutcome::Unregistered);
}

#[test]
fn test_nat_source_change_updates_row() {
    let (state, uc) = setup();
    let nat = HostEntry::new("home.example.", HostMode::Address, "192.168.1.10", None, true).unwrap();
    let moved: SocketAddr = "203.0.113.9:40000".parse().unwrap();

    uc.execute(RegistrationMessage::register(nat.clone(), Utc::now()), source())
        .unwrap();
    let outcome = uc
        .execute(RegistrationMessage::register(nat, Utc::now()), moved)
        .unwrap();

    assert_eq!(outcome, RegistrationOutcome::Updated);
    state.rebuild(Instant::now());
    assert_eq!(
        state.host_map().get("home.example.")[0].address(),
        Some(Ipv4Addr::new(203, 0, 113, 9))
    );
}

#[test]
fn test_nat_over_mapped_ipv6_source() {
    let (state, uc) = setup();
    let nat = HostEntry::new("home.example.", HostMode::Address, "192.168.1.10", None, true).unwrap();
    let mapped: SocketAddr = "[::ffff:203.0.113.5]:40000".parse().unwrap();

    uc.execute(RegistrationMessage::register(nat, Utc::now()), mapped)
        .unwrap();
    state.rebuild(Instant::now());

    assert_eq!(
        state.host_map().get("home.example.")[0].address(),
        Some(Ipv4Addr::new(203, 0, 113, 5))
    );
}

#[test]
fn test_nat_over_pure_ipv6_source_is_dropped() {
    let (state, uc) = setup();
    let nat = HostEntry::new("home.example.", HostMode::Address, "192.168.1.10", None, true).unwrap();
    let v6: SocketAddr = "[2001:db8::1]:40000".parse().unwrap();

    let result = uc.execute(RegistrationMessage::register(nat, Utc::now()), v6);

    assert!(matches!(result, Err(DomainError::NatSourceNotIpv4(_))));
    assert_eq!(state.registration_count(), 0);
}

#[test]
fn test_nat_flag_ignored_for_cname() {
    let (state, uc) = setup();
    let cname = HostEntry::new("alias.example.", HostMode::CName, "backend.example.", None, true).unwrap();

    uc.execute(RegistrationMessage::register(cname, Utc::now()), source())
        .unwrap();
    state.rebuild(Instant::now());

    let map = state.host_map();
    assert_eq!(
        map.get("alias.example.")[0].target_name().map(|n| &**n),
        Some("backend.example.")
    );
}
