use ddns_application::use_cases::ResolveDnsQueryUseCase;
use ddns_domain::{DnsAnswer, DnsQuestion, DomainError};
use hickory_proto::op::{Header, ResponseCode};
use hickory_proto::rr::Record;
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};
use hickory_server::ServerFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::wire::{self, MAX_UDP_RESPONSE};
use crate::system::{bind_tcp, bind_udp};

const TCP_IDLE_TIMEOUT: Duration = Duration::from_secs(10);
const UDP_RECV_BUFFER: usize = 4096;

#[derive(Clone)]
pub struct DnsServerHandler {
    use_case: Arc<ResolveDnsQueryUseCase>,
}

impl DnsServerHandler {
    pub fn new(use_case: Arc<ResolveDnsQueryUseCase>) -> Self {
        Self { use_case }
    }

    /// Answers one raw request. `None` means nothing should be sent back.
    pub fn handle_raw(&self, request: &[u8], max_len: usize) -> Option<Vec<u8>> {
        let parsed = match wire::parse_request(request) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Unparseable DNS request");
                return wire::build_raw_format_error(request);
            }
        };

        let result = match &parsed.question {
            Some(question) => wire::build_response(&parsed, &self.answer(question), max_len),
            None => wire::build_format_error(&parsed),
        };

        match result {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(error = %e, "Failed to build DNS response");
                wire::build_server_failure(&parsed).ok()
            }
        }
    }

    fn answer(&self, question: &DnsQuestion) -> DnsAnswer {
        let answer = self.use_case.execute(question);
        debug!(
            name = %question.name,
            qtype = question.raw_type,
            status = ?answer.status,
            answers = answer.answers.len(),
            "DNS query answered"
        );
        answer
    }
}

#[async_trait::async_trait]
impl RequestHandler for DnsServerHandler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> ResponseInfo {
        let request_info = match request.request_info() {
            Ok(info) => info,
            Err(e) => {
                debug!(error = %e, "Failed to parse request info");
                return send_error_response(request, &mut response_handle, ResponseCode::FormErr)
                    .await;
            }
        };

        let question = wire::to_question(request_info.query.original(), request.header().op_code());
        let answer = self.answer(&question);

        let (answers, additional) = match wire::to_records(&answer) {
            Ok(records) => records,
            Err(e) => {
                warn!(name = %question.name, error = %e, "Failed to build DNS response");
                return send_error_response(request, &mut response_handle, ResponseCode::ServFail)
                    .await;
            }
        };

        let builder = MessageResponseBuilder::from_message_request(request);
        let mut header = Header::response_from_request(request.header());
        header.set_response_code(wire::response_code(answer.status));
        header.set_authoritative(answer.authoritative);
        let response = builder.build(header, answers.iter(), &[], &[], additional.iter());

        match response_handle.send_response(response).await {
            Ok(info) => info,
            Err(e) => {
                debug!(error = %e, "Failed to send TCP response");
                ResponseInfo::from(*request.header())
            }
        }
    }
}

async fn send_error_response<R: ResponseHandler>(
    request: &Request,
    response_handle: &mut R,
    code: ResponseCode,
) -> ResponseInfo {
    let builder = MessageResponseBuilder::from_message_request(request);
    let mut header = Header::response_from_request(request.header());
    header.set_response_code(code);
    let response = builder.build(header, &[] as &[Record], &[], &[], &[]);

    match response_handle.send_response(response).await {
        Ok(info) => info,
        Err(e) => {
            debug!(error = %e, "Failed to send error response");
            ResponseInfo::from(*request.header())
        }
    }
}

/// UDP and TCP front end on one bind address.
pub struct DnsServer {
    udp: UdpSocket,
    tcp: TcpListener,
    handler: Arc<DnsServerHandler>,
}

impl DnsServer {
    pub fn bind(socket_addr: SocketAddr, handler: Arc<DnsServerHandler>) -> Result<Self, DomainError> {
        let udp = bind_udp(socket_addr)?;
        // Port 0 binds TCP to whatever port UDP was given.
        let tcp_addr = udp.local_addr()?;
        let tcp = bind_tcp(tcp_addr)?;
        Ok(Self { udp, tcp, handler })
    }

    pub fn udp_local_addr(&self) -> Result<SocketAddr, DomainError> {
        Ok(self.udp.local_addr()?)
    }

    pub fn tcp_local_addr(&self) -> Result<SocketAddr, DomainError> {
        Ok(self.tcp.local_addr()?)
    }

    pub async fn run(self, shutdown: CancellationToken) {
        info!(bind_address = ?self.udp.local_addr().ok(), "DNS server ready");

        let Self { udp, tcp, handler } = self;
        let mut join_set: JoinSet<()> = JoinSet::new();

        join_set.spawn(run_udp(udp, Arc::clone(&handler), shutdown.clone()));
        join_set.spawn(run_tcp(tcp, (*handler).clone(), shutdown));

        while let Some(result) = join_set.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "DNS server task failed");
            }
        }
        info!("DNS server stopped");
    }
}

async fn run_udp(socket: UdpSocket, handler: Arc<DnsServerHandler>, shutdown: CancellationToken) {
    let socket = Arc::new(socket);
    let mut recv_buf = [0u8; UDP_RECV_BUFFER];

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            received = socket.recv_from(&mut recv_buf) => match received {
                Ok((n, from)) => {
                    let handler = Arc::clone(&handler);
                    let socket = Arc::clone(&socket);
                    let query: Arc<[u8]> = Arc::from(&recv_buf[..n]);
                    tokio::spawn(async move {
                        if let Some(response) = handler.handle_raw(&query, MAX_UDP_RESPONSE) {
                            if let Err(e) = socket.send_to(&response, from).await {
                                debug!(client = %from, error = %e, "UDP send failed");
                            }
                        }
                    });
                }
                Err(e) => {
                    warn!(error = %e, "UDP recv error");
                }
            },
        }
    }
}

async fn run_tcp(listener: TcpListener, handler: DnsServerHandler, shutdown: CancellationToken) {
    let mut server = ServerFuture::new(handler);
    server.register_listener(listener, TCP_IDLE_TIMEOUT);

    tokio::select! {
        _ = shutdown.cancelled() => {}
        result = server.block_until_done() => {
            if let Err(e) = result {
                error!(error = %e, "TCP DNS server error");
            }
        }
    }
}
