use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::host_entry::HostEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationFlags {
    Register,
    Unregister,
}

impl RegistrationFlags {
    pub fn to_u8(self) -> u8 {
        match self {
            RegistrationFlags::Register => 1,
            RegistrationFlags::Unregister => 2,
        }
    }

    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            1 => Some(RegistrationFlags::Register),
            2 => Some(RegistrationFlags::Unregister),
            _ => None,
        }
    }
}

/// A decoded registration packet. Applied once and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationMessage {
    pub entry: HostEntry,
    pub flags: RegistrationFlags,
    pub timestamp: DateTime<Utc>,
}

impl RegistrationMessage {
    pub fn register(entry: HostEntry, timestamp: DateTime<Utc>) -> Self {
        Self {
            entry,
            flags: RegistrationFlags::Register,
            timestamp,
        }
    }

    pub fn unregister(entry: HostEntry, timestamp: DateTime<Utc>) -> Self {
        Self {
            entry,
            flags: RegistrationFlags::Unregister,
            timestamp,
        }
    }

    /// Signed distance between `now` and the sender's clock, in seconds.
    /// Positive when the message is older than `now`.
    pub fn skew_secs(&self, now: DateTime<Utc>) -> i64 {
        now.signed_duration_since(self.timestamp).num_seconds()
    }

    /// Replay window check. Messages older or newer than `message_ttl`
    /// relative to `now` are rejected.
    pub fn is_within(&self, now: DateTime<Utc>, message_ttl: Duration) -> bool {
        now.signed_duration_since(self.timestamp)
            .abs()
            .to_std()
            .is_ok_and(|skew| skew <= message_ttl)
    }
}
