use chrono::{DateTime, NaiveDate, Utc};
use ddns_domain::config::SoaConfig;
use ddns_domain::{
    AnswerRecord, DnsAnswer, DnsQuestion, HostEntry, HostMode, RecordData, RecordType,
    ResponseStatus, SoaData,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::services::DdnsState;

const MX_PREFERENCE: u16 = 10;
const ADMIN_MAILBOX: &str = "dnsadmin";

/// Answers A, CNAME, MX, NS and SOA queries from the published host map.
pub struct ResolveDnsQueryUseCase {
    state: Arc<DdnsState>,
    default_ttl: u32,
    soa: SoaConfig,
    log_unresolved: bool,
}

impl ResolveDnsQueryUseCase {
    pub fn new(state: Arc<DdnsState>, default_ttl: u32, soa: SoaConfig) -> Self {
        Self {
            state,
            default_ttl,
            soa,
            log_unresolved: false,
        }
    }

    pub fn with_unresolved_logging(mut self, enabled: bool) -> Self {
        self.log_unresolved = enabled;
        self
    }

    pub fn execute(&self, question: &DnsQuestion) -> DnsAnswer {
        let mut rng = fastrand::Rng::new();
        self.execute_with_rng(question, &mut rng)
    }

    pub fn execute_with_rng(&self, question: &DnsQuestion, rng: &mut fastrand::Rng) -> DnsAnswer {
        self.state.counters().query();

        if !question.internet_class || !question.standard_query {
            return self.unresolved(question, DnsAnswer::refused());
        }
        let Some(record_type) = question.record_type else {
            return self.unresolved(question, DnsAnswer::not_implemented());
        };

        let mut answer = DnsAnswer::with_status(ResponseStatus::NoError);
        match record_type {
            RecordType::SOA => self.answer_soa(question, &mut answer),
            RecordType::NS => self.answer_ns(question, &mut answer),
            RecordType::MX => self.answer_mx(question, &mut answer),
            RecordType::A | RecordType::CNAME => self.answer_address(question, &mut answer, rng),
        }

        if answer.status == ResponseStatus::NoError && answer.answers.is_empty() {
            answer.status = ResponseStatus::Name;
        }
        answer.authoritative = true;

        if answer.status == ResponseStatus::Name {
            self.state.counters().name_error();
            return self.unresolved(question, answer);
        }
        answer
    }

    fn unresolved(&self, question: &DnsQuestion, answer: DnsAnswer) -> DnsAnswer {
        if self.log_unresolved {
            warn!(
                name = %question.name,
                qtype = question.raw_type,
                status = ?answer.status,
                "Unresolved DNS query"
            );
        } else {
            debug!(
                name = %question.name,
                qtype = question.raw_type,
                status = ?answer.status,
                "Unresolved DNS query"
            );
        }
        answer
    }

    fn ttl_of(&self, entry: &HostEntry) -> u32 {
        entry.ttl.unwrap_or(self.default_ttl)
    }

    fn answer_soa(&self, question: &DnsQuestion, answer: &mut DnsAnswer) {
        let name_servers = self.state.name_servers();
        let Some(primary) = name_servers.first() else {
            return;
        };

        let zone = zone_of(&question.name);
        let soa = SoaData {
            mname: Arc::clone(&primary.host),
            rname: Arc::from(format!("{}.{}", ADMIN_MAILBOX, zone)),
            serial: soa_serial(Utc::now()),
            refresh: self.soa.refresh,
            retry: self.soa.retry,
            expire: self.soa.expire,
            minimum: self.soa.minimum,
        };
        answer.answers.push(AnswerRecord::new(
            Arc::clone(&question.name),
            self.default_ttl,
            RecordData::Soa(soa),
        ));
        self.push_name_servers(&question.name, &name_servers, &mut answer.additional);
    }

    fn answer_ns(&self, question: &DnsQuestion, answer: &mut DnsAnswer) {
        let name_servers = self.state.name_servers();
        let mut records = Vec::with_capacity(name_servers.len() * 2);
        self.push_name_servers(&question.name, &name_servers, &mut records);

        let (ns, glue): (Vec<_>, Vec<_>) = records
            .into_iter()
            .partition(|r| matches!(r.data, RecordData::Ns(_)));
        answer.answers.extend(ns);
        answer.additional.extend(glue);
    }

    fn push_name_servers(&self, owner: &Arc<str>, name_servers: &[HostEntry], out: &mut Vec<AnswerRecord>) {
        for ns in name_servers {
            out.push(AnswerRecord::new(
                Arc::clone(owner),
                self.ttl_of(ns),
                RecordData::Ns(Arc::clone(&ns.host)),
            ));
        }
        for ns in name_servers {
            if let Some(ip) = ns.address() {
                out.push(AnswerRecord::new(
                    Arc::clone(&ns.host),
                    self.ttl_of(ns),
                    RecordData::A(ip),
                ));
            }
        }
    }

    fn answer_mx(&self, question: &DnsQuestion, answer: &mut DnsAnswer) {
        let host_map = self.state.host_map();
        for entry in host_map.get(&question.name) {
            if entry.mode != HostMode::Mx {
                continue;
            }
            if let Some(exchange) = entry.target_name() {
                answer.answers.push(AnswerRecord::new(
                    Arc::clone(&question.name),
                    self.ttl_of(entry),
                    RecordData::Mx {
                        preference: MX_PREFERENCE,
                        exchange: Arc::clone(exchange),
                    },
                ));
            }
        }
    }

    fn answer_address(&self, question: &DnsQuestion, answer: &mut DnsAnswer, rng: &mut fastrand::Rng) {
        let host_map = self.state.host_map();
        let entries = host_map.get(&question.name);
        if entries.is_empty() {
            answer.status = ResponseStatus::Name;
            return;
        }

        let Some(mode) = HostMode::arbitrate(entries.iter().map(|e| e.mode)) else {
            answer.status = ResponseStatus::Name;
            return;
        };

        // Longest declared TTL among address-path entries wins when sources
        // disagree. MX entries do not take part.
        let ttl = entries
            .iter()
            .filter(|e| e.mode.rank().is_some())
            .filter_map(|e| e.ttl)
            .max()
            .unwrap_or(self.default_ttl);

        let matching: Vec<&HostEntry> = entries.iter().filter(|e| e.mode == mode).collect();
        let name = &question.name;

        match mode {
            HostMode::Address => {
                let picked = matching[rng.usize(..matching.len())];
                if let Some(ip) = picked.address() {
                    answer.answers.push(AnswerRecord::new(Arc::clone(name), ttl, RecordData::A(ip)));
                }
            }
            HostMode::AddressList => {
                answer.answers.extend(
                    matching
                        .iter()
                        .filter_map(|e| e.address())
                        .map(|ip| AnswerRecord::new(Arc::clone(name), ttl, RecordData::A(ip))),
                );
            }
            HostMode::CName => {
                let picked = matching[rng.usize(..matching.len())];
                let Some(target) = picked.target_name() else {
                    return;
                };
                answer.answers.push(AnswerRecord::new(
                    Arc::clone(name),
                    ttl,
                    RecordData::CName(Arc::clone(target)),
                ));
                if let Some(addresses) = self.state.cached_addresses(target) {
                    let ip = addresses[rng.usize(..addresses.len())];
                    answer
                        .additional
                        .push(AnswerRecord::new(Arc::clone(target), ttl, RecordData::A(ip)));
                }
            }
            HostMode::Mx => {}
        }
    }
}

/// Second-level domain of `name`, each label dot-terminated. Empty for the
/// root.
fn zone_of(name: &str) -> String {
    let labels: Vec<&str> = name.split('.').filter(|l| !l.is_empty()).collect();
    let start = labels.len().saturating_sub(2);
    labels[start..].iter().map(|l| format!("{}.", l)).collect()
}

/// Whole seconds since 2000-01-01T00:00:00Z.
pub fn soa_serial(now: DateTime<Utc>) -> u32 {
    let epoch = NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(DateTime::UNIX_EPOCH);
    now.signed_duration_since(epoch)
        .num_seconds()
        .clamp(0, i64::from(u32::MAX)) as u32
}
