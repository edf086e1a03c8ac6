pub mod ddns;
pub mod errors;
pub mod logging;
pub mod root;
pub mod server;
pub mod soa;

pub use ddns::{DdnsConfig, DdnsMode, ParsedLines};
pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use soa::SoaConfig;
