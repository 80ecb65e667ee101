use crate::error::Result;
use crate::table::Task;
use reqwest::Client;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Method selector for the standard ERC-20 `decimals()` call.
pub const DECIMALS_SELECTOR: &str = "0x313ce567";

/// Fallback precision when a contract cannot be queried.
pub const DEFAULT_DECIMALS: u32 = 18;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// One fetch attempt. `body` is None on non-2xx status; transport failures
/// surface as `Err` from the fetch call itself.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub status: u16,
    pub body: Option<String>,
}

/// Builds a fresh client for a single task. Clients are deliberately not
/// shared: cookie and keep-alive state must not leak between rows.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?)
}

/// Free public RPC nodes, keyed by lowercased network name.
pub fn default_rpc_endpoints() -> HashMap<String, String> {
    [
        ("ethereum", "https://eth.llamarpc.com"),
        ("bsc", "https://bsc-dataseed.binance.org"),
        ("polygon", "https://polygon-rpc.com"),
        ("arbitrum", "https://arb1.arbitrum.io/rpc"),
        ("avalanche", "https://api.avax.network/ext/bc/C/rpc"),
        ("fantom", "https://rpc.ftm.tools"),
        ("optimism", "https://mainnet.optimism.io"),
        ("base", "https://mainnet.base.org"),
    ]
    .into_iter()
    .map(|(network, url)| (network.to_string(), url.to_string()))
    .collect()
}

/// Case-insensitive endpoint lookup. Unknown networks get no guess.
pub fn rpc_endpoint<'a>(endpoints: &'a HashMap<String, String>, network: &str) -> Option<&'a str> {
    endpoints.get(&network.to_lowercase()).map(String::as_str)
}

pub fn pool_page_url(base_url: &str, task: &Task) -> Result<Url> {
    let raw = format!(
        "{}/{}/{}/",
        base_url.trim_end_matches('/'),
        task.network,
        task.address
    );
    Url::parse(&raw).map_err(|e| crate::error::Error::Config(format!("bad pool URL {raw}: {e}")))
}

/// Single GET against the DEX pool page. One attempt, no retry; a non-2xx
/// status is an outcome (body None), not an error.
pub async fn fetch_pool_page(client: &Client, base_url: &str, task: &Task) -> Result<FetchOutcome> {
    let url = pool_page_url(base_url, task)?;
    log::info!("requesting {url}");

    let res = client.get(url.clone()).send().await?;
    let status = res.status().as_u16();

    if !res.status().is_success() {
        log::warn!("{url} returned status {status}");
        return Ok(FetchOutcome { status, body: None });
    }

    match res.text().await {
        Ok(body) => {
            log::debug!("body length: {} bytes", body.len());
            Ok(FetchOutcome {
                status,
                body: Some(body),
            })
        }
        Err(e) => {
            log::error!("failed reading body from {url}: {e}");
            Ok(FetchOutcome { status, body: None })
        }
    }
}

/// JSON-RPC `eth_call` for `decimals()`. Returns the raw hex result string,
/// or None on any transport, status or shape problem.
pub async fn eth_call_decimals(client: &Client, rpc_url: &str, address: &str) -> Option<String> {
    let payload = json!({
        "jsonrpc": "2.0",
        "method": "eth_call",
        "params": [{"to": address, "data": DECIMALS_SELECTOR}, "latest"],
        "id": 1,
    });

    let res = match client.post(rpc_url).json(&payload).send().await {
        Ok(res) => res,
        Err(e) => {
            log::error!("RPC request to {rpc_url} failed: {e}");
            return None;
        }
    };

    if !res.status().is_success() {
        log::error!("RPC request failed with status {}", res.status());
        return None;
    }

    let body: Value = match res.json().await {
        Ok(body) => body,
        Err(e) => {
            log::error!("malformed RPC response from {rpc_url}: {e}");
            return None;
        }
    };

    match body.get("result").and_then(Value::as_str) {
        Some(hex) if !hex.is_empty() && hex != "0x" => Some(hex.to_string()),
        _ => {
            log::warn!("RPC call returned empty result: {body}");
            None
        }
    }
}

/// Big-endian hex with any amount of leading-zero padding. Malformed input
/// falls back to the default precision.
pub fn decode_hex_decimals(hex: &str) -> u32 {
    let digits = hex
        .trim_start_matches("0x")
        .trim_start_matches('0');
    if digits.is_empty() {
        return 0;
    }
    u32::from_str_radix(digits, 16).unwrap_or_else(|e| {
        log::error!("hex decode failed for {hex}: {e}");
        DEFAULT_DECIMALS
    })
}
