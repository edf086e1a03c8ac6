use ddns_application::services::RuntimeCounters;
use ddns_application::use_cases::{ApplyRegistrationUseCase, RegistrationOutcome};
use ddns_domain::DomainError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::codec::{RegistrationCodec, MAX_PACKET_LEN};
use crate::system::bind_udp;

/// Receive loop for registration datagrams.
///
/// Every packet is decoded, checked and applied inline; failures are
/// logged and the loop re-arms.
pub struct UdpRegistrationListener {
    socket: UdpSocket,
    codec: Arc<RegistrationCodec>,
    apply: Arc<ApplyRegistrationUseCase>,
    counters: Arc<RuntimeCounters>,
}

impl UdpRegistrationListener {
    pub fn bind(
        socket_addr: SocketAddr,
        codec: Arc<RegistrationCodec>,
        apply: Arc<ApplyRegistrationUseCase>,
        counters: Arc<RuntimeCounters>,
    ) -> Result<Self, DomainError> {
        let socket = bind_udp(socket_addr)?;
        Ok(Self {
            socket,
            codec,
            apply,
            counters,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, DomainError> {
        Ok(self.socket.local_addr()?)
    }

    pub async fn run(self, shutdown: CancellationToken) {
        let mut buf = vec![0u8; MAX_PACKET_LEN];
        info!(bind = ?self.socket.local_addr().ok(), "Registration listener started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Registration listener: shutting down");
                    break;
                }
                received = self.socket.recv_from(&mut buf) => match received {
                    Ok((len, source)) => match self.handle_packet(&buf[..len], source) {
                        Ok(outcome) => debug!(%source, ?outcome, "Registration applied"),
                        Err(e) => debug!(%source, error = %e, "Registration packet discarded"),
                    },
                    Err(e) => {
                        warn!(error = %e, "Registration receive failed");
                    }
                },
            }
        }
    }

    /// Decodes and applies one datagram, keeping the packet counters.
    pub fn handle_packet(
        &self,
        packet: &[u8],
        source: SocketAddr,
    ) -> Result<RegistrationOutcome, DomainError> {
        self.counters.packet_received();

        let result = self
            .codec
            .decode(packet)
            .and_then(|message| self.apply.execute(message, source));
        if result.is_err() {
            self.counters.packet_rejected();
        }
        result
    }
}
