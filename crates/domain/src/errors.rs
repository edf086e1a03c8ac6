use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid host mode: {0}")]
    InvalidHostMode(String),

    #[error("Invalid TTL: {0}")]
    InvalidTtl(String),

    #[error("Invalid host line: {0}")]
    InvalidHostLine(String),

    #[error("Invalid address cache line: {0}")]
    InvalidAddressCacheLine(String),

    #[error("Name server must use address mode: {0}")]
    NameServerNotAddress(String),

    #[error("Malformed registration packet: {0}")]
    MalformedRegistration(String),

    #[error("Registration packet failed authentication")]
    RegistrationAuthFailed,

    #[error("Registration timestamp outside replay window ({skew_secs}s skew)")]
    RegistrationExpired { skew_secs: i64 },

    #[error("NAT registration from non-IPv4 source: {0}")]
    NatSourceNotIpv4(String),

    #[error("Address lookup failed for {host}: {reason}")]
    LookupFailed { host: String, reason: String },

    #[error("Query timeout")]
    QueryTimeout,

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Invalid DNS request: {0}")]
    InvalidDnsRequest(String),
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::IoError(err.to_string())
    }
}
