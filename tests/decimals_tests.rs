//! End-to-end decimals runs against a mock JSON-RPC node.

use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokentab::aggregate::Aggregator;
use tokentab::fetch::DEFAULT_DECIMALS;
use tokentab::jobs::DecimalsJob;
use tokentab::pool::Scheduler;
use tokentab::table::Task;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn task(index: usize, network: &str, address: &str) -> Task {
    Task {
        index,
        network: network.to_string(),
        address: address.to_string(),
    }
}

fn endpoints(server: &MockServer) -> HashMap<String, String> {
    HashMap::from([("testnet".to_string(), server.uri())])
}

#[tokio::test]
async fn decimals_resolve_with_prefix_added_and_network_lowercased() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "eth_call",
            "params": [{"to": "0xA0b8deadbeef", "data": "0x313ce567"}, "latest"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": "0x06",
        })))
        .mount(&server)
        .await;

    // Network cased oddly, address missing its 0x prefix.
    let tasks = vec![task(0, "TestNet", "A0b8deadbeef")];

    let aggregator = Arc::new(Aggregator::new(tasks.len()));
    let job = Arc::new(DecimalsJob::new(endpoints(&server), Duration::from_secs(5)));
    let scheduler = Scheduler::new(1, Duration::from_millis(0), None);
    scheduler.run(job, tasks, aggregator.clone()).await;

    assert_eq!(aggregator.finish(DEFAULT_DECIMALS).await, vec![6]);
}

#[tokio::test]
async fn unsupported_network_and_blank_row_default_without_requests() {
    let server = MockServer::start().await;

    let tasks = vec![task(0, "solana", "0x1"), task(1, "testnet", "")];

    let aggregator = Arc::new(Aggregator::new(tasks.len()));
    let job = Arc::new(DecimalsJob::new(endpoints(&server), Duration::from_secs(5)));
    let scheduler = Scheduler::new(2, Duration::from_millis(0), None);
    scheduler.run(job, tasks, aggregator.clone()).await;

    assert_eq!(
        aggregator.finish(DEFAULT_DECIMALS).await,
        vec![DEFAULT_DECIMALS, DEFAULT_DECIMALS]
    );
    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(scheduler.snapshot().rows_defaulted, 2);
}

#[tokio::test]
async fn empty_rpc_result_defaults_to_eighteen() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": "0x",
        })))
        .mount(&server)
        .await;

    let tasks = vec![task(0, "testnet", "0xabc")];

    let aggregator = Arc::new(Aggregator::new(tasks.len()));
    let job = Arc::new(DecimalsJob::new(endpoints(&server), Duration::from_secs(5)));
    let scheduler = Scheduler::new(1, Duration::from_millis(0), None);
    scheduler.run(job, tasks, aggregator.clone()).await;

    assert_eq!(aggregator.finish(DEFAULT_DECIMALS).await, vec![18]);
}

#[tokio::test]
async fn rpc_error_response_defaults_to_eighteen() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32000, "message": "execution reverted"},
        })))
        .mount(&server)
        .await;

    let tasks = vec![task(0, "testnet", "0xabc")];

    let aggregator = Arc::new(Aggregator::new(tasks.len()));
    let job = Arc::new(DecimalsJob::new(endpoints(&server), Duration::from_secs(5)));
    let scheduler = Scheduler::new(1, Duration::from_millis(0), None);
    scheduler.run(job, tasks, aggregator.clone()).await;

    assert_eq!(aggregator.finish(DEFAULT_DECIMALS).await, vec![18]);
}

#[tokio::test]
async fn padded_hex_result_decodes_big_endian() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": "0x0000000000000000000000000000000000000000000000000000000000000012",
        })))
        .mount(&server)
        .await;

    let tasks = vec![task(0, "testnet", "0xabc")];

    let aggregator = Arc::new(Aggregator::new(tasks.len()));
    let job = Arc::new(DecimalsJob::new(endpoints(&server), Duration::from_secs(5)));
    let scheduler = Scheduler::new(1, Duration::from_millis(0), None);
    scheduler.run(job, tasks, aggregator.clone()).await;

    assert_eq!(aggregator.finish(DEFAULT_DECIMALS).await, vec![18]);
}
