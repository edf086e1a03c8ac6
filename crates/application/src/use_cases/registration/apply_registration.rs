use chrono::{DateTime, Utc};
use ddns_domain::{DomainError, RegistrationFlags, RegistrationMessage};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::services::{DdnsState, RegisterOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered,
    Refreshed,
    /// Known key whose TTL, NAT flag or NAT address moved.
    Updated,
    Unregistered,
    /// Unregister for a key that was never registered.
    NotRegistered,
}

/// Applies one decoded registration to the UDP table.
pub struct ApplyRegistrationUseCase {
    state: Arc<DdnsState>,
    message_ttl: Duration,
    registration_ttl: Duration,
}

impl ApplyRegistrationUseCase {
    pub fn new(state: Arc<DdnsState>, message_ttl: Duration, registration_ttl: Duration) -> Self {
        Self {
            state,
            message_ttl,
            registration_ttl,
        }
    }

    pub fn execute(
        &self,
        message: RegistrationMessage,
        source: SocketAddr,
    ) -> Result<RegistrationOutcome, DomainError> {
        self.execute_at(message, source, Utc::now(), Instant::now())
    }

    pub fn execute_at(
        &self,
        message: RegistrationMessage,
        source: SocketAddr,
        now: DateTime<Utc>,
        clock: Instant,
    ) -> Result<RegistrationOutcome, DomainError> {
        if !message.is_within(now, self.message_ttl) {
            return Err(DomainError::RegistrationExpired {
                skew_secs: message.skew_secs(now),
            });
        }

        // Keyed on the payload as sent so NAT re-registrations from a new
        // source address replace their previous row.
        let key = message.entry.canonical_key();

        match message.flags {
            RegistrationFlags::Register => {
                let mut entry = message.entry;
                if entry.is_nat && entry.mode.is_address_family() {
                    let observed = nat_source(source)?;
                    debug!(host = %entry.host, claimed = %entry.target, %observed, "NAT override");
                    entry = entry.with_address(observed);
                }

                let outcome = self
                    .state
                    .register(key, entry, clock + self.registration_ttl);
                self.state.counters().registration();
                Ok(match outcome {
                    RegisterOutcome::Inserted => RegistrationOutcome::Registered,
                    RegisterOutcome::Refreshed => RegistrationOutcome::Refreshed,
                    RegisterOutcome::Updated => RegistrationOutcome::Updated,
                })
            }
            RegistrationFlags::Unregister => {
                if self.state.unregister(&key) {
                    self.state.counters().unregistration();
                    Ok(RegistrationOutcome::Unregistered)
                } else {
                    Ok(RegistrationOutcome::NotRegistered)
                }
            }
        }
    }
}

fn nat_source(source: SocketAddr) -> Result<Ipv4Addr, DomainError> {
    match source.ip() {
        IpAddr::V4(ip) => Ok(ip),
        IpAddr::V6(ip) => ip
            .to_ipv4_mapped()
            .ok_or_else(|| DomainError::NatSourceNotIpv4(ip.to_string())),
    }
}
