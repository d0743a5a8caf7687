use clap::Parser;
use ledger_core::service::{NodeService, RegisterPeersRequest};
use ledger_node::client::HttpPeerClient;
use ledger_node::config::Args;
use ledger_node::routes::{router, AppState};
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.node_config();
    let client = HttpPeerClient::new(config.peer_timeout)?;
    let service = NodeService::new(config, client);

    if !args.peers.is_empty() {
        let peers = service
            .register_peers(RegisterPeersRequest {
                nodes: Some(args.peers.clone()),
            })
            .await?;
        info!(?peers, "registered startup peers");
    }

    let app = router(AppState::new(service.clone()));

    let addr: SocketAddr = args.listen.parse()?;
    info!(node_id = service.node_id(), "ledger-node listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal(service))
        .await?;
    Ok(())
}

async fn shutdown_signal(service: NodeService<HttpPeerClient>) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down, cancelling proof-of-work");
    service.shutdown();
}
