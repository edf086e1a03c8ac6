use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::DomainError;

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// How a host entry wants its name answered.
///
/// Modes only mix during arbitration: when registrants disagree the
/// highest-ranked mode wins and the other entries are filtered out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostMode {
    /// One A record, picked at random among matching entries.
    Address,
    /// One A record per matching entry.
    AddressList,
    /// One CNAME record, picked at random.
    CName,
    /// Mail exchanger. Served only to MX queries.
    Mx,
}

impl HostMode {
    /// Arbitration rank for the A/CNAME path. `Mx` never competes.
    pub fn rank(self) -> Option<u8> {
        match self {
            HostMode::CName => Some(1),
            HostMode::Address => Some(2),
            HostMode::AddressList => Some(3),
            HostMode::Mx => None,
        }
    }

    /// Folds a set of modes into the winning one, or `None` when no mode
    /// takes part in A/CNAME arbitration.
    pub fn arbitrate<I>(modes: I) -> Option<HostMode>
    where
        I: IntoIterator<Item = HostMode>,
    {
        modes
            .into_iter()
            .filter_map(|mode| mode.rank().map(|rank| (rank, mode)))
            .fold(None, |winner: Option<(u8, HostMode)>, candidate| match winner {
                Some(current) if current.0 >= candidate.0 => Some(current),
                _ => Some(candidate),
            })
            .map(|(_, mode)| mode)
    }

    pub fn is_address_family(self) -> bool {
        matches!(self, HostMode::Address | HostMode::AddressList)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HostMode::Address => "address",
            HostMode::AddressList => "addresslist",
            HostMode::CName => "cname",
            HostMode::Mx => "mx",
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            HostMode::Address => 0,
            HostMode::AddressList => 1,
            HostMode::CName => 2,
            HostMode::Mx => 3,
        }
    }

    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0 => Some(HostMode::Address),
            1 => Some(HostMode::AddressList),
            2 => Some(HostMode::CName),
            3 => Some(HostMode::Mx),
            _ => None,
        }
    }
}

impl fmt::Display for HostMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "address" => Ok(HostMode::Address),
            "addresslist" => Ok(HostMode::AddressList),
            "cname" => Ok(HostMode::CName),
            "mx" => Ok(HostMode::Mx),
            other => Err(DomainError::InvalidHostMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostTarget {
    Address(Ipv4Addr),
    Name(Arc<str>),
}

impl HostTarget {
    /// Parses `raw` according to `mode`: IPv4 literal for the address
    /// family, domain name otherwise.
    pub fn parse(mode: HostMode, raw: &str) -> Result<Self, DomainError> {
        let raw = raw.trim();
        if mode.is_address_family() {
            raw.parse::<Ipv4Addr>()
                .map(HostTarget::Address)
                .map_err(|_| DomainError::InvalidIpAddress(raw.to_string()))
        } else {
            normalize_domain_name(raw).map(HostTarget::Name)
        }
    }
}

impl fmt::Display for HostTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostTarget::Address(ip) => write!(f, "{}", ip),
            HostTarget::Name(name) => f.write_str(name),
        }
    }
}

/// One published name-to-target binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostEntry {
    /// Lowercase, dot-terminated.
    pub host: Arc<str>,
    pub mode: HostMode,
    pub target: HostTarget,
    /// `None` means the entry does not declare a TTL.
    pub ttl: Option<u32>,
    pub is_nat: bool,
}

impl HostEntry {
    pub fn new(
        host: &str,
        mode: HostMode,
        target: &str,
        ttl: Option<u32>,
        is_nat: bool,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            host: normalize_domain_name(host)?,
            mode,
            target: HostTarget::parse(mode, target)?,
            ttl: ttl.filter(|ttl| *ttl > 0),
            is_nat,
        })
    }

    /// Parses `name,target[,ttl[,mode[,NAT]]]`.
    pub fn parse_line(line: &str) -> Result<Self, DomainError> {
        let (host, rest) = line
            .split_once(',')
            .ok_or_else(|| DomainError::InvalidHostLine(line.trim().to_string()))?;
        Self::parse_fields(host, rest)
    }

    /// Parses the `target[,ttl[,mode[,NAT]]]` remainder of a host line for
    /// an already known host name.
    pub fn parse_fields(host: &str, fields: &str) -> Result<Self, DomainError> {
        let parts: Vec<&str> = fields.split(',').map(str::trim).collect();
        if parts.len() > 4 || parts[0].is_empty() {
            return Err(DomainError::InvalidHostLine(format!("{},{}", host, fields)));
        }

        let ttl = match parts.get(1) {
            Some(raw) if !raw.is_empty() => Some(
                raw.parse::<u32>()
                    .map_err(|_| DomainError::InvalidTtl(raw.to_string()))?,
            ),
            _ => None,
        };

        let mode = match parts.get(2) {
            Some(raw) if !raw.is_empty() => raw.parse::<HostMode>()?,
            _ => HostMode::Address,
        };

        let is_nat = match parts.get(3) {
            Some(raw) => parse_nat_flag(raw)?,
            None => false,
        };

        Self::new(host, mode, parts[0], ttl, is_nat)
    }

    /// Identity of the entry in the UDP registration table.
    ///
    /// TTL and the NAT flag are not part of the key, so a re-registration
    /// with a different TTL refreshes the existing row.
    pub fn canonical_key(&self) -> String {
        format!("{}|{}|{}", self.host, self.mode, self.target)
    }

    pub fn address(&self) -> Option<Ipv4Addr> {
        match self.target {
            HostTarget::Address(ip) => Some(ip),
            HostTarget::Name(_) => None,
        }
    }

    pub fn target_name(&self) -> Option<&Arc<str>> {
        match &self.target {
            HostTarget::Name(name) => Some(name),
            HostTarget::Address(_) => None,
        }
    }

    pub fn with_address(&self, ip: Ipv4Addr) -> Self {
        Self {
            target: HostTarget::Address(ip),
            ..self.clone()
        }
    }

    /// The `target[,ttl[,mode[,NAT]]]` form used for cluster properties.
    pub fn to_property_value(&self) -> String {
        let ttl = self.ttl.map(|t| t.to_string()).unwrap_or_default();
        let mut value = format!("{},{},{}", self.target, ttl, self.mode);
        if self.is_nat {
            value.push_str(",nat");
        }
        value
    }
}

impl fmt::Display for HostEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.host, self.to_property_value())
    }
}

fn parse_nat_flag(raw: &str) -> Result<bool, DomainError> {
    match raw.to_ascii_lowercase().as_str() {
        "nat" | "true" | "yes" | "1" => Ok(true),
        "" | "false" | "no" | "0" => Ok(false),
        other => Err(DomainError::InvalidHostLine(format!(
            "unknown NAT flag '{}'",
            other
        ))),
    }
}

/// Lowercases, dot-terminates and validates a host name.
pub fn normalize_domain_name(raw: &str) -> Result<Arc<str>, DomainError> {
    let trimmed = raw.trim();
    let bare = trimmed.strip_suffix('.').unwrap_or(trimmed);

    if bare.is_empty() || bare.len() > MAX_NAME_LEN {
        return Err(DomainError::InvalidDomainName(trimmed.to_string()));
    }

    for label in bare.split('.') {
        let valid = !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !valid {
            return Err(DomainError::InvalidDomainName(trimmed.to_string()));
        }
    }

    let mut name = bare.to_ascii_lowercase();
    name.push('.');
    Ok(Arc::from(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arbitration_prefers_address_list() {
        let winner = HostMode::arbitrate([HostMode::Address, HostMode::AddressList, HostMode::CName]);
        assert_eq!(winner, Some(HostMode::AddressList));
    }

    #[test]
    fn test_arbitration_address_beats_cname() {
        assert_eq!(
            HostMode::arbitrate([HostMode::CName, HostMode::Address]),
            Some(HostMode::Address)
        );
    }

    #[test]
    fn test_arbitration_ignores_mx() {
        assert_eq!(HostMode::arbitrate([HostMode::Mx]), None);
        assert_eq!(
            HostMode::arbitrate([HostMode::Mx, HostMode::CName]),
            Some(HostMode::CName)
        );
    }

    #[test]
    fn test_arbitration_empty_is_none() {
        assert_eq!(HostMode::arbitrate(std::iter::empty()), None);
    }

    #[test]
    fn test_mode_wire_codes_are_stable() {
        for mode in [HostMode::Address, HostMode::AddressList, HostMode::CName, HostMode::Mx] {
            assert_eq!(HostMode::from_u8(mode.to_u8()), Some(mode));
        }
        assert_eq!(HostMode::from_u8(9), None);
    }

    #[test]
    fn test_normalize_lowercases_and_terminates() {
        assert_eq!(&*normalize_domain_name("WWW.Example.COM").unwrap(), "www.example.com.");
        assert_eq!(&*normalize_domain_name("a.b.").unwrap(), "a.b.");
    }

    #[test]
    fn test_normalize_rejects_bad_labels() {
        assert!(normalize_domain_name("").is_err());
        assert!(normalize_domain_name(".").is_err());
        assert!(normalize_domain_name("a..b").is_err());
        assert!(normalize_domain_name("-bad.example").is_err());
        assert!(normalize_domain_name("sp ace.example").is_err());
        assert!(normalize_domain_name(&"x".repeat(64)).is_err());
    }
}
