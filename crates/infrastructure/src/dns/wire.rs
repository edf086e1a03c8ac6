//! Translation between DNS wire messages and the domain question/answer model.

use ddns_domain::{AnswerRecord, DnsAnswer, DnsQuestion, DomainError, RecordData, ResponseStatus};
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::{A, CNAME, MX, NS, SOA};
use hickory_proto::rr::{DNSClass, Name, RData, Record};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::sync::Arc;

use super::record_type_map::RecordTypeMapper;

/// Classic DNS-over-UDP payload limit.
pub const MAX_UDP_RESPONSE: usize = 512;
/// Two-byte length prefix bound for DNS over TCP.
pub const MAX_TCP_RESPONSE: usize = u16::MAX as usize;

/// An incoming request reduced to what the responder needs.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    pub id: u16,
    pub op_code: OpCode,
    pub recursion_desired: bool,
    /// Echoed back verbatim in the response.
    pub query: Option<Query>,
    pub question: Option<DnsQuestion>,
}

pub fn parse_request(bytes: &[u8]) -> Result<ParsedRequest, DomainError> {
    let message = Message::from_vec(bytes)
        .map_err(|e| DomainError::InvalidDnsRequest(format!("Failed to parse DNS request: {}", e)))?;

    if message.message_type() != MessageType::Query {
        return Err(DomainError::InvalidDnsRequest(
            "message is not a query".to_string(),
        ));
    }

    let query = message.queries().first().cloned();
    let question = query.as_ref().map(|q| to_question(q, message.op_code()));

    Ok(ParsedRequest {
        id: message.id(),
        op_code: message.op_code(),
        recursion_desired: message.recursion_desired(),
        query,
        question,
    })
}

/// Lowercased, fully qualified question for the answer synthesizer.
pub fn to_question(query: &Query, op_code: OpCode) -> DnsQuestion {
    let mut name = query.name().to_ascii();
    name.make_ascii_lowercase();
    if !name.ends_with('.') {
        name.push('.');
    }
    DnsQuestion {
        name: Arc::from(name),
        record_type: RecordTypeMapper::from_hickory(query.query_type()),
        raw_type: u16::from(query.query_type()),
        internet_class: query.query_class() == DNSClass::IN,
        standard_query: op_code == OpCode::Query,
    }
}

/// Answer and additional sections of `answer` as hickory records.
pub fn to_records(answer: &DnsAnswer) -> Result<(Vec<Record>, Vec<Record>), DomainError> {
    let answers = answer
        .answers
        .iter()
        .map(to_record)
        .collect::<Result<Vec<_>, _>>()?;
    let additional = answer
        .additional
        .iter()
        .map(to_record)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((answers, additional))
}

/// Serializes `answer` as the response to `request`.
///
/// When the full message exceeds `max_len` the answer and additional
/// sections are dropped and TC is set.
pub fn build_response(
    request: &ParsedRequest,
    answer: &DnsAnswer,
    max_len: usize,
) -> Result<Vec<u8>, DomainError> {
    let mut message = response_header(request, response_code(answer.status));
    message.set_authoritative(answer.authoritative);

    let (answers, additional) = to_records(answer)?;
    message.add_answers(answers);
    message.add_additionals(additional);

    let bytes = serialize(&message)?;
    if bytes.len() <= max_len {
        return Ok(bytes);
    }

    let mut truncated = response_header(request, response_code(answer.status));
    truncated.set_authoritative(answer.authoritative);
    truncated.set_truncated(true);
    serialize(&truncated)
}

/// FORMERR for requests that parse but carry no question.
pub fn build_format_error(request: &ParsedRequest) -> Result<Vec<u8>, DomainError> {
    serialize(&response_header(request, ResponseCode::FormErr))
}

/// SERVFAIL for answers that could not be encoded.
pub fn build_server_failure(request: &ParsedRequest) -> Result<Vec<u8>, DomainError> {
    serialize(&response_header(request, ResponseCode::ServFail))
}

/// FORMERR from the raw header when the message does not parse at all.
///
/// Returns `None` when there is no header to answer.
pub fn build_raw_format_error(bytes: &[u8]) -> Option<Vec<u8>> {
    if bytes.len() < 12 {
        return None;
    }
    let mut header = [0u8; 12];
    header[0] = bytes[0];
    header[1] = bytes[1];
    // QR set, opcode copied, RD copied.
    header[2] = 0x80 | (bytes[2] & 0x79);
    header[3] = ResponseCode::FormErr.low();
    Some(header.to_vec())
}

fn response_header(request: &ParsedRequest, code: ResponseCode) -> Message {
    let mut message = Message::new(request.id, MessageType::Response, request.op_code);
    message.set_recursion_desired(request.recursion_desired);
    message.set_recursion_available(false);
    message.set_response_code(code);
    if let Some(query) = &request.query {
        message.add_query(query.clone());
    }
    message
}

pub fn response_code(status: ResponseStatus) -> ResponseCode {
    match status {
        ResponseStatus::NoError => ResponseCode::NoError,
        ResponseStatus::Name => ResponseCode::NXDomain,
        ResponseStatus::Refused => ResponseCode::Refused,
        ResponseStatus::NotImpl => ResponseCode::NotImp,
    }
}

fn to_record(record: &AnswerRecord) -> Result<Record, DomainError> {
    let rdata = match &record.data {
        RecordData::A(ip) => RData::A(A(*ip)),
        RecordData::CName(target) => RData::CNAME(CNAME(to_name(target)?)),
        RecordData::Ns(target) => RData::NS(NS(to_name(target)?)),
        RecordData::Mx {
            preference,
            exchange,
        } => RData::MX(MX::new(*preference, to_name(exchange)?)),
        RecordData::Soa(soa) => RData::SOA(SOA::new(
            to_name(&soa.mname)?,
            to_name(&soa.rname)?,
            soa.serial,
            soa.refresh,
            soa.retry,
            soa.expire,
            soa.minimum,
        )),
    };
    Ok(Record::from_rdata(to_name(&record.name)?, record.ttl, rdata))
}

fn to_name(name: &str) -> Result<Name, DomainError> {
    Name::from_ascii(name)
        .map_err(|e| DomainError::InvalidDomainName(format!("Invalid name '{}': {}", name, e)))
}

fn serialize(message: &Message) -> Result<Vec<u8>, DomainError> {
    let mut buf = Vec::with_capacity(MAX_UDP_RESPONSE);
    let mut encoder = BinEncoder::new(&mut buf);
    message.emit(&mut encoder).map_err(|e| {
        DomainError::InvalidDnsRequest(format!("Failed to serialize DNS message: {}", e))
    })?;
    Ok(buf)
}
