use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JobConfig {
    /// Input table path. The first column is the network, the second the
    /// contract address; extra columns are ignored on read.
    #[serde(default = "default_input")]
    #[validate(length(min = 1))]
    pub input: String,

    #[serde(default = "default_workers")]
    #[validate(range(min = 1, max = 64))]
    pub workers: usize,

    /// Post-task pacing delay per worker, to stay under upstream rate limits.
    #[serde(default = "default_delay")]
    pub delay_ms: u64,

    #[serde(default = "default_timeout")]
    #[validate(range(min = 1))]
    pub timeout_secs: u64,

    #[serde(default = "default_base_url")]
    #[validate(url)]
    pub base_url: String,

    /// Network name (lowercase) -> JSON-RPC endpoint.
    #[serde(default = "crate::fetch::default_rpc_endpoints")]
    pub rpc_endpoints: HashMap<String, String>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            workers: default_workers(),
            delay_ms: default_delay(),
            timeout_secs: default_timeout(),
            base_url: default_base_url(),
            rpc_endpoints: crate::fetch::default_rpc_endpoints(),
        }
    }
}

fn default_input() -> String {
    "test.csv".to_string()
}

fn default_workers() -> usize {
    5
}

fn default_delay() -> u64 {
    1000
}

fn default_timeout() -> u64 {
    30
}

fn default_base_url() -> String {
    "https://dex.coinmarketcap.com/token".to_string()
}
