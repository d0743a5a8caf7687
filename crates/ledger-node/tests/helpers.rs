#![allow(dead_code)]

use std::time::Duration;

use axum::{routing::get, Json, Router};
use ledger_core::consensus::ChainResponse;
use ledger_core::service::{NodeConfig, NodeService};
use ledger_node::client::HttpPeerClient;
use ledger_node::routes::{router, AppState};
use tokio::net::TcpListener;

pub struct TestNode {
    pub addr: String,
    pub service: NodeService<HttpPeerClient>,
}

impl TestNode {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Starts a node on an ephemeral port.
pub async fn spawn_node(node_id: &str) -> anyhow::Result<TestNode> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?.to_string();

    let mut config = NodeConfig::new(node_id);
    config.peer_timeout = Duration::from_secs(2);
    let client = HttpPeerClient::new(config.peer_timeout)?;
    let service = NodeService::new(config, client);

    let app = router(AppState::new(service.clone()));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(TestNode { addr, service })
}

/// Serves a fixed `GET /chain` body, whatever it contains.
pub async fn spawn_static_peer(response: ChainResponse) -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?.to_string();
    let app = Router::new().route(
        "/chain",
        get(move || {
            let response = response.clone();
            async move { Json(response) }
        }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

/// Answers every request with a 500.
pub async fn spawn_failing_peer() -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?.to_string();
    let app = Router::new().route(
        "/chain",
        get(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

/// An address nothing is listening on.
pub async fn closed_addr() -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?.to_string();
    drop(listener);
    Ok(addr)
}
