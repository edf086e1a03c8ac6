use ddns_application::use_cases::ResolveDnsQueryUseCase;
use ddns_infrastructure::dns::{DnsServer, DnsServerHandler};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub fn start_dns_server(
    bind_addr: &str,
    use_case: Arc<ResolveDnsQueryUseCase>,
    shutdown: CancellationToken,
) -> anyhow::Result<JoinHandle<()>> {
    let socket_addr: SocketAddr = bind_addr.parse()?;
    let handler = Arc::new(DnsServerHandler::new(use_case));
    let server = DnsServer::bind(socket_addr, handler)?;

    info!(bind_address = %socket_addr, "Starting DNS server (UDP + TCP)");
    Ok(tokio::spawn(server.run(shutdown)))
}
