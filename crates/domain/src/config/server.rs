use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// UDP and TCP DNS listener address.
    #[serde(default = "default_dns_bind")]
    pub dns_bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            dns_bind: default_dns_bind(),
        }
    }
}

fn default_dns_bind() -> String {
    "0.0.0.0:53".to_string()
}
