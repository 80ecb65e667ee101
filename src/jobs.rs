use crate::error::{Error, Result};
use crate::extract::{Pipeline, PoolMetrics};
use crate::fetch::{self, DEFAULT_DECIMALS};
use crate::pool::RowJob;
use crate::table::Task;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Metrics variant: GET the DEX pool page and run the extraction pipeline.
pub struct PoolMetricsJob {
    base_url: String,
    timeout: Duration,
    pipeline: Pipeline,
}

impl PoolMetricsJob {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self {
            base_url,
            timeout,
            pipeline: Pipeline::new(),
        }
    }
}

#[async_trait]
impl RowJob for PoolMetricsJob {
    type Value = PoolMetrics;

    fn fallback(&self) -> PoolMetrics {
        PoolMetrics::zero()
    }

    async fn process(&self, task: &Task) -> Result<PoolMetrics> {
        if task.is_blank() {
            return Err(Error::MalformedRow(task.index));
        }

        let client = fetch::build_client(self.timeout)?;
        let outcome = fetch::fetch_pool_page(&client, &self.base_url, task).await?;

        match outcome.body {
            Some(body) => Ok(self.pipeline.run(&body)),
            None => {
                log::warn!(
                    "row {}: status {} from pool page, using defaults",
                    task.index + 1,
                    outcome.status
                );
                Ok(PoolMetrics::zero())
            }
        }
    }
}

/// Decimals variant: `eth_call` the token's `decimals()` on the network's
/// RPC node. Anything that goes wrong resolves to the default of 18.
pub struct DecimalsJob {
    endpoints: HashMap<String, String>,
    timeout: Duration,
}

impl DecimalsJob {
    pub fn new(endpoints: HashMap<String, String>, timeout: Duration) -> Self {
        Self { endpoints, timeout }
    }
}

#[async_trait]
impl RowJob for DecimalsJob {
    type Value = u32;

    fn fallback(&self) -> u32 {
        DEFAULT_DECIMALS
    }

    async fn process(&self, task: &Task) -> Result<u32> {
        if task.is_blank() {
            return Err(Error::MalformedRow(task.index));
        }

        let rpc_url = fetch::rpc_endpoint(&self.endpoints, &task.network)
            .ok_or_else(|| Error::UnsupportedNetwork(task.network.clone()))?;

        // RPC nodes insist on the 0x prefix even where the sheet omits it.
        let address = if task.address.starts_with("0x") {
            task.address.clone()
        } else {
            format!("0x{}", task.address)
        };

        log::info!(
            "querying decimals for {} on {}",
            address,
            task.network.to_lowercase()
        );

        let client = fetch::build_client(self.timeout)?;
        match fetch::eth_call_decimals(&client, rpc_url, &address).await {
            Some(hex) => Ok(fetch::decode_hex_decimals(&hex)),
            None => {
                log::warn!(
                    "row {}: no decimals result, defaulting to {}",
                    task.index + 1,
                    DEFAULT_DECIMALS
                );
                Ok(DEFAULT_DECIMALS)
            }
        }
    }
}
