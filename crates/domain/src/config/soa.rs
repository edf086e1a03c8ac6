use serde::{Deserialize, Serialize};

/// Timers published in synthesized SOA records.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SoaConfig {
    #[serde(default = "default_refresh")]
    pub refresh: i32,

    #[serde(default = "default_retry")]
    pub retry: i32,

    #[serde(default = "default_expire")]
    pub expire: i32,

    #[serde(default = "default_minimum")]
    pub minimum: u32,
}

impl Default for SoaConfig {
    fn default() -> Self {
        Self {
            refresh: default_refresh(),
            retry: default_retry(),
            expire: default_expire(),
            minimum: default_minimum(),
        }
    }
}

fn default_refresh() -> i32 {
    3600
}

fn default_retry() -> i32 {
    600
}

fn default_expire() -> i32 {
    604_800
}

fn default_minimum() -> u32 {
    60
}
