use ddns_application::services::DdnsState;
use ddns_domain::config::{DdnsConfig, ParsedLines};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Parses the configured line lists and seeds the shared state.
pub fn build_state(config: &DdnsConfig) -> Arc<DdnsState> {
    let hosts = report("Host", config.parse_hosts());
    let name_servers = report("NameServer", config.parse_name_servers());
    let address_cache = report("AddressCache", config.parse_address_cache(Instant::now()));

    info!(
        hosts = hosts.len(),
        name_servers = name_servers.len(),
        address_cache = address_cache.len(),
        "Loaded static configuration"
    );

    Arc::new(DdnsState::new(hosts, name_servers, address_cache))
}

fn report<T>(kind: &str, parsed: ParsedLines<T>) -> Vec<T> {
    for (line, error) in &parsed.rejected {
        warn!(kind, line = %line, error = %error, "Skipping invalid configuration line");
    }
    parsed.valid
}
