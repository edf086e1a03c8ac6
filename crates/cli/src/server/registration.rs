use anyhow::Context;
use ddns_application::services::RuntimeCounters;
use ddns_application::use_cases::ApplyRegistrationUseCase;
use ddns_domain::config::DdnsConfig;
use ddns_infrastructure::registration::{RegistrationCodec, UdpRegistrationListener};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub fn start_registration_listener(
    config: &DdnsConfig,
    apply: Arc<ApplyRegistrationUseCase>,
    counters: Arc<RuntimeCounters>,
    shutdown: CancellationToken,
) -> anyhow::Result<JoinHandle<()>> {
    let socket_addr: SocketAddr = config.udp_binding.parse()?;
    let shared_key = config
        .shared_key
        .as_deref()
        .context("ddns.shared_key is required for UDP registration")?;
    let codec = Arc::new(RegistrationCodec::new(shared_key)?);
    let listener = UdpRegistrationListener::bind(socket_addr, codec, apply, counters)?;

    info!(bind_address = %socket_addr, "Starting UDP registration listener");
    Ok(tokio::spawn(listener.run(shutdown)))
}
