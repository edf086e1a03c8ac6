//! Registration packet codec.
//!
//! Packet layout: `nonce(12) || ChaCha20-Poly1305(plaintext) || tag(16)`,
//! keyed with SHA-256 of the shared key. Plaintext:
//!
//! | field     | size              |
//! |-----------|-------------------|
//! | magic     | 4 (`DDNS`)        |
//! | version   | 1                 |
//! | flags     | 1                 |
//! | timestamp | 8 (ms, i64 BE)    |
//! | ttl       | 4 (0 = undeclared)|
//! | mode      | 1                 |
//! | nat       | 1                 |
//! | host      | 2 + len           |
//! | target    | 2 + len           |

use bytes::{Buf, BufMut};
use chrono::DateTime;
use ddns_domain::{DomainError, HostEntry, HostMode, RegistrationFlags, RegistrationMessage};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, CHACHA20_POLY1305, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};

const MAGIC: &[u8; 4] = b"DDNS";
const VERSION: u8 = 1;
const AAD: &[u8] = b"DDNS1";
const TAG_LEN: usize = 16;
const FIXED_HEADER_LEN: usize = 4 + 1 + 1 + 8 + 4 + 1 + 1;

/// Receive buffer size. Larger datagrams are truncated and fail to open.
pub const MAX_PACKET_LEN: usize = 1024;

pub struct RegistrationCodec {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl RegistrationCodec {
    pub fn new(shared_key: &str) -> Result<Self, DomainError> {
        if shared_key.is_empty() {
            return Err(DomainError::MalformedRegistration(
                "shared key is empty".to_string(),
            ));
        }
        let digest = Sha256::digest(shared_key.as_bytes());
        let unbound = UnboundKey::new(&CHACHA20_POLY1305, &digest)
            .map_err(|_| DomainError::MalformedRegistration("invalid key length".to_string()))?;
        Ok(Self {
            key: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
        })
    }

    /// Authenticates and decodes one datagram.
    ///
    /// The replay window is not checked here.
    pub fn decode(&self, packet: &[u8]) -> Result<RegistrationMessage, DomainError> {
        if packet.len() < NONCE_LEN + TAG_LEN + FIXED_HEADER_LEN {
            return Err(DomainError::MalformedRegistration(format!(
                "packet too short ({} bytes)",
                packet.len()
            )));
        }

        let (nonce_bytes, sealed) = packet.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| DomainError::RegistrationAuthFailed)?;

        let mut in_out = sealed.to_vec();
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::from(AAD), &mut in_out)
            .map_err(|_| DomainError::RegistrationAuthFailed)?;

        decode_plaintext(plaintext)
    }

    /// Seals `message` with a fresh random nonce.
    pub fn encode(&self, message: &RegistrationMessage) -> Result<Vec<u8>, DomainError> {
        let entry = &message.entry;
        let host = entry.host.as_bytes();
        let target = entry.target.to_string();

        let mut plaintext =
            Vec::with_capacity(FIXED_HEADER_LEN + 4 + host.len() + target.len() + TAG_LEN);
        plaintext.put_slice(MAGIC);
        plaintext.put_u8(VERSION);
        plaintext.put_u8(message.flags.to_u8());
        plaintext.put_i64(message.timestamp.timestamp_millis());
        plaintext.put_u32(entry.ttl.unwrap_or(0));
        plaintext.put_u8(entry.mode.to_u8());
        plaintext.put_u8(u8::from(entry.is_nat));
        put_string(&mut plaintext, host)?;
        put_string(&mut plaintext, target.as_bytes())?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| DomainError::IoError("nonce generation failed".to_string()))?;

        self.key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::from(AAD),
                &mut plaintext,
            )
            .map_err(|_| DomainError::MalformedRegistration("seal failed".to_string()))?;

        let mut packet = Vec::with_capacity(NONCE_LEN + plaintext.len());
        packet.put_slice(&nonce_bytes);
        packet.put_slice(&plaintext);
        Ok(packet)
    }
}

fn put_string(buf: &mut Vec<u8>, value: &[u8]) -> Result<(), DomainError> {
    let len = u16::try_from(value.len())
        .map_err(|_| DomainError::MalformedRegistration("field too long".to_string()))?;
    buf.put_u16(len);
    buf.put_slice(value);
    Ok(())
}

fn decode_plaintext(mut buf: &[u8]) -> Result<RegistrationMessage, DomainError> {
    ensure(buf, FIXED_HEADER_LEN)?;

    if &buf[..MAGIC.len()] != MAGIC {
        return Err(malformed("bad magic"));
    }
    buf.advance(MAGIC.len());

    let version = buf.get_u8();
    if version != VERSION {
        return Err(malformed(&format!("unsupported version {}", version)));
    }

    let flags = RegistrationFlags::from_u8(buf.get_u8()).ok_or_else(|| malformed("bad flags"))?;
    let millis = buf.get_i64();
    let ttl = buf.get_u32();
    let mode = HostMode::from_u8(buf.get_u8()).ok_or_else(|| malformed("bad mode"))?;
    let is_nat = buf.get_u8() != 0;
    let host = get_string(&mut buf)?;
    let target = get_string(&mut buf)?;

    if buf.has_remaining() {
        return Err(malformed("trailing bytes"));
    }

    let timestamp =
        DateTime::from_timestamp_millis(millis).ok_or_else(|| malformed("bad timestamp"))?;
    let entry = HostEntry::new(host, mode, target, Some(ttl), is_nat)?;

    Ok(RegistrationMessage {
        entry,
        flags,
        timestamp,
    })
}

fn get_string<'a>(buf: &mut &'a [u8]) -> Result<&'a str, DomainError> {
    ensure(*buf, 2)?;
    let len = usize::from(buf.get_u16());
    ensure(*buf, len)?;
    let current: &'a [u8] = *buf;
    let (value, rest) = current.split_at(len);
    *buf = rest;
    std::str::from_utf8(value).map_err(|_| malformed("non UTF-8 string"))
}

fn ensure(buf: &[u8], needed: usize) -> Result<(), DomainError> {
    if buf.remaining() < needed {
        return Err(malformed("truncated payload"));
    }
    Ok(())
}

fn malformed(reason: &str) -> DomainError {
    DomainError::MalformedRegistration(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn codec() -> RegistrationCodec {
        RegistrationCodec::new("correct horse battery staple").unwrap()
    }

    fn message() -> RegistrationMessage {
        let entry = HostEntry::new("svc.example.", HostMode::AddressList, "10.0.0.7", Some(30), true)
            .unwrap();
        RegistrationMessage::register(entry, Utc::now())
    }

    #[test]
    fn test_round_trip_keeps_entry_and_flags() {
        let codec = codec();
        let original = message();

        let decoded = codec.decode(&codec.encode(&original).unwrap()).unwrap();

        assert_eq!(decoded.entry, original.entry);
        assert_eq!(decoded.flags, original.flags);
        assert_eq!(
            decoded.timestamp.timestamp_millis(),
            original.timestamp.timestamp_millis()
        );
    }

    #[test]
    fn test_nonce_differs_per_packet() {
        let codec = codec();
        let msg = message();
        assert_ne!(codec.encode(&msg).unwrap(), codec.encode(&msg).unwrap());
    }

    #[test]
    fn test_wrong_key_fails_authentication() {
        let packet = codec().encode(&message()).unwrap();
        let other = RegistrationCodec::new("another key").unwrap();
        assert_eq!(other.decode(&packet), Err(DomainError::RegistrationAuthFailed));
    }

    #[test]
    fn test_tampered_packet_fails_authentication() {
        let codec = codec();
        let mut packet = codec.encode(&message()).unwrap();
        let last = packet.len() - 1;
        packet[last] ^= 0x01;
        assert_eq!(codec.decode(&packet), Err(DomainError::RegistrationAuthFailed));
    }

    #[test]
    fn test_short_packet_is_malformed() {
        assert!(matches!(
            codec().decode(&[0u8; 20]),
            Err(DomainError::MalformedRegistration(_))
        ));
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(RegistrationCodec::new("").is_err());
    }

    #[test]
    fn test_plaintext_trailing_bytes_rejected() {
        let mut plain = Vec::new();
        plain.put_slice(MAGIC);
        plain.put_u8(VERSION);
        plain.put_u8(1);
        plain.put_i64(0);
        plain.put_u32(0);
        plain.put_u8(0);
        plain.put_u8(0);
        put_string(&mut plain, b"a.example.").unwrap();
        put_string(&mut plain, b"10.0.0.1").unwrap();
        assert!(decode_plaintext(&plain).is_ok());

        plain.push(0);
        assert!(decode_plaintext(&plain).is_err());
    }

    #[test]
    fn test_plaintext_invalid_target_rejected() {
        let mut plain = Vec::new();
        plain.put_slice(MAGIC);
        plain.put_u8(VERSION);
        plain.put_u8(1);
        plain.put_i64(0);
        plain.put_u32(0);
        plain.put_u8(HostMode::Address.to_u8());
        plain.put_u8(0);
        put_string(&mut plain, b"a.example.").unwrap();
        put_string(&mut plain, b"not-an-ip").unwrap();
        assert!(matches!(
            decode_plaintext(&plain),
            Err(DomainError::InvalidIpAddress(_))
        ));
    }
}
