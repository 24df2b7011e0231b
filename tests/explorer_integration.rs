use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::task::JoinHandle;

use chain_pulse::collector::{collect, CollectSettings};
use chain_pulse::explorer::{ExplorerClient, ExplorerError};
use chain_pulse::retry::RetryPolicy;
use chain_pulse::stats::{NetworkReport, DEFAULT_TOP_ADDRESSES};

#[derive(Clone, Default)]
struct MockExplorer {
    block_requests: Arc<AtomicUsize>,
    failing_tx_requests: Arc<AtomicUsize>,
    rate_limited: bool,
}

async fn blocks(
    State(mock): State<MockExplorer>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    mock.block_requests.fetch_add(1, Ordering::SeqCst);
    if mock.rate_limited {
        return (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response();
    }

    if params.get("block_number").map(String::as_str) == Some("101") {
        return Json(json!({
            "items": [
                { "hash": "0x101", "height": 101, "timestamp": "1970-01-01T00:16:50Z", "transaction_count": 1 },
                { "hash": "0x100", "height": 100, "timestamp": "1970-01-01T00:16:40Z", "transaction_count": 0 },
            ],
            "next_page_params": null,
        }))
        .into_response();
    }

    Json(json!({
        "items": [
            { "hash": "0x103", "height": 103, "timestamp": "1970-01-01T00:17:20Z", "transaction_count": 2 },
            { "hash": "0x102", "height": 102, "timestamp": "1970-01-01T00:17:05Z", "tx_count": 4 },
        ],
        "next_page_params": { "block_number": 101, "items_count": 2 },
    }))
    .into_response()
}

async fn block_transactions(State(mock): State<MockExplorer>, Path(number): Path<u64>) -> Response {
    match number {
        103 => Json(json!({
            "items": [
                {
                    "hash": "0xt1",
                    "from": { "hash": "0xAAA" },
                    "to": { "hash": "0xbbb" },
                    "value": "1000000000000000000",
                    "gas_price": "10000000000",
                    "timestamp": "1970-01-01T00:17:20Z",
                },
                {
                    "hash": "0xt2",
                    "from": { "hash": "0xaaa" },
                    "to": null,
                    "value": "0",
                    "gas_price": "30000000000",
                    "timestamp": "1970-01-01T00:17:20Z",
                },
            ],
            "next_page_params": null,
        }))
        .into_response(),
        102 => {
            mock.failing_tx_requests.fetch_add(1, Ordering::SeqCst);
            (StatusCode::INTERNAL_SERVER_ERROR, "upstream unavailable").into_response()
        }
        101 => Json(json!({
            "items": [
                {
                    "hash": "0xt3",
                    "from": { "hash": "0xccc" },
                    "to": { "hash": "0xAAA" },
                    "value": "2000000000000000000",
                    "gas_price": "not-a-number",
                    "timestamp": "1970-01-01T00:16:50Z",
                },
            ],
            "next_page_params": null,
        }))
        .into_response(),
        _ => (StatusCode::NOT_FOUND, "unknown block").into_response(),
    }
}

async fn spawn_explorer(mock: MockExplorer) -> (String, JoinHandle<()>) {
    let app = Router::new()
        .route("/api/v2/blocks", get(blocks))
        .route("/api/v2/blocks/:number/transactions", get(block_transactions))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let base_url = format!("http://{}/api/v2", addr);
    let server = axum::serve(listener, app);
    let handle = tokio::spawn(async move {
        let _ = server.await;
    });

    (base_url, handle)
}

fn settings(block_count: usize) -> CollectSettings {
    CollectSettings {
        block_count,
        tx_page_size: 50,
        retry: RetryPolicy::new(3, Duration::from_millis(1)),
    }
}

#[tokio::test]
async fn lists_blocks_across_pages() {
    let mock = MockExplorer::default();
    let (base_url, handle) = spawn_explorer(mock.clone()).await;
    let client = ExplorerClient::new(&base_url).unwrap();

    let blocks = client.list_recent_blocks(4).await.unwrap();
    let numbers: Vec<u64> = blocks.iter().map(|b| b.number).collect();
    assert_eq!(numbers, vec![103, 102, 101, 100]);
    assert_eq!(blocks[0].timestamp, 1040);
    assert_eq!(blocks[1].transaction_count, 4);
    assert_eq!(mock.block_requests.load(Ordering::SeqCst), 2);

    let first_page_only = client.list_recent_blocks(1).await.unwrap();
    assert_eq!(first_page_only.len(), 1);
    handle.abort();
}

#[tokio::test]
async fn collect_skips_blocks_whose_transactions_fail() {
    let mock = MockExplorer::default();
    let (base_url, handle) = spawn_explorer(mock.clone()).await;
    let client = ExplorerClient::new(&base_url).unwrap();

    let collection = collect(&client, &settings(4)).await.unwrap();
    assert_eq!(collection.blocks.len(), 4);
    assert_eq!(collection.skipped_blocks, vec![102]);
    assert_eq!(mock.failing_tx_requests.load(Ordering::SeqCst), 3);

    let hashes: Vec<&str> = collection.transactions.iter().map(|t| t.hash.as_str()).collect();
    assert_eq!(hashes, vec!["0xt1", "0xt2", "0xt3"]);

    let report = NetworkReport::build(
        &collection.blocks,
        &collection.transactions,
        DEFAULT_TOP_ADDRESSES,
    );
    assert_eq!(report.volume.total_transactions, 7);
    assert_eq!(report.block_time.min, 10);
    assert_eq!(report.block_time.max, 15);

    let txs = report.transactions.unwrap();
    assert_eq!(txs.gas_price.total_transactions, 3);
    assert_eq!(txs.gas_price.avg, 20.0);
    assert_eq!(txs.value.total, 3.0);
    assert_eq!(txs.deployments.total_deployments, 1);
    assert_eq!(txs.addresses.unique_addresses, 3);
    assert_eq!(txs.top_addresses[0].address, "0xaaa");
    assert_eq!(txs.top_addresses[0].count, 3);
    handle.abort();
}

#[tokio::test]
async fn rate_limited_block_list_is_fatal() {
    let mock = MockExplorer {
        rate_limited: true,
        ..MockExplorer::default()
    };
    let (base_url, handle) = spawn_explorer(mock.clone()).await;
    let client = ExplorerClient::new(&base_url).unwrap();

    let err = collect(&client, &settings(10)).await.unwrap_err();
    assert!(matches!(err, ExplorerError::RateLimited));
    assert!(err.is_rate_limited());
    assert_eq!(mock.block_requests.load(Ordering::SeqCst), 3);
    handle.abort();
}

#[tokio::test]
async fn api_errors_carry_status() {
    let mock = MockExplorer::default();
    let (base_url, handle) = spawn_explorer(mock).await;
    let client = ExplorerClient::new(&base_url).unwrap();

    let err = client.get_transactions_for_block(999, 10).await.unwrap_err();
    match err {
        ExplorerError::Api { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "unknown block");
        }
        other => panic!("unexpected error: {other}"),
    }
    handle.abort();
}
