use std::net::Ipv4Addr;
use std::sync::Arc;

use crate::dns_record::RecordType;

/// The parts of an incoming query the answer synthesizer looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuestion {
    /// Lowercase, dot-terminated.
    pub name: Arc<str>,
    /// `None` when the query type is not one we serve.
    pub record_type: Option<RecordType>,
    pub raw_type: u16,
    /// Class IN.
    pub internet_class: bool,
    /// Opcode QUERY.
    pub standard_query: bool,
}

impl DnsQuestion {
    pub fn new(name: &str, record_type: RecordType) -> Self {
        let mut name = name.to_ascii_lowercase();
        if !name.ends_with('.') {
            name.push('.');
        }
        Self {
            name: Arc::from(name),
            record_type: Some(record_type),
            raw_type: record_type.to_u16(),
            internet_class: true,
            standard_query: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    NoError,
    /// NXDOMAIN.
    Name,
    Refused,
    NotImpl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoaData {
    pub mname: Arc<str>,
    pub rname: Arc<str>,
    pub serial: u32,
    pub refresh: i32,
    pub retry: i32,
    pub expire: i32,
    pub minimum: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    CName(Arc<str>),
    Mx { preference: u16, exchange: Arc<str> },
    Ns(Arc<str>),
    Soa(SoaData),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub name: Arc<str>,
    pub ttl: u32,
    pub data: RecordData,
}

impl AnswerRecord {
    pub fn new(name: Arc<str>, ttl: u32, data: RecordData) -> Self {
        Self { name, ttl, data }
    }
}

/// Wire-independent response content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsAnswer {
    pub status: ResponseStatus,
    pub authoritative: bool,
    pub answers: Vec<AnswerRecord>,
    pub additional: Vec<AnswerRecord>,
}

impl DnsAnswer {
    pub fn with_status(status: ResponseStatus) -> Self {
        Self {
            status,
            authoritative: false,
            answers: Vec::new(),
            additional: Vec::new(),
        }
    }

    pub fn refused() -> Self {
        Self::with_status(ResponseStatus::Refused)
    }

    pub fn not_implemented() -> Self {
        Self::with_status(ResponseStatus::NotImpl)
    }

    pub fn name_error() -> Self {
        Self {
            authoritative: true,
            ..Self::with_status(ResponseStatus::Name)
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::NoError
    }

    /// A addresses in the answer section, in order.
    pub fn answer_addresses(&self) -> Vec<Ipv4Addr> {
        self.answers
            .iter()
            .filter_map(|r| match r.data {
                RecordData::A(ip) => Some(ip),
                _ => None,
            })
            .collect()
    }
}
