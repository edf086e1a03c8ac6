use chrono::Utc;
use ddns_domain::{DomainError, HostEntry, RegistrationMessage};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::debug;

use super::codec::RegistrationCodec;

/// Client side of the registration protocol.
pub struct RegistrationSender {
    socket: UdpSocket,
    codec: RegistrationCodec,
    target: SocketAddr,
}

impl RegistrationSender {
    pub async fn connect(target: SocketAddr, shared_key: &str) -> Result<Self, DomainError> {
        let local: SocketAddr = if target.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).await?;
        Ok(Self {
            socket,
            codec: RegistrationCodec::new(shared_key)?,
            target,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, DomainError> {
        Ok(self.socket.local_addr()?)
    }

    pub async fn register(&self, entry: &HostEntry) -> Result<(), DomainError> {
        self.send(&RegistrationMessage::register(entry.clone(), Utc::now()))
            .await
    }

    pub async fn unregister(&self, entry: &HostEntry) -> Result<(), DomainError> {
        self.send(&RegistrationMessage::unregister(entry.clone(), Utc::now()))
            .await
    }

    pub async fn send(&self, message: &RegistrationMessage) -> Result<(), DomainError> {
        let packet = self.codec.encode(message)?;
        self.socket.send_to(&packet, self.target).await?;
        debug!(host = %message.entry.host, flags = ?message.flags, target = %self.target, "Registration sent");
        Ok(())
    }
}
