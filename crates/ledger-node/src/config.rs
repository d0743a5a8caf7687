use std::time::Duration;

use clap::Parser;
use ledger_core::constants::DEFAULT_PEER_TIMEOUT_MS;
use ledger_core::service::NodeConfig;

use crate::constants::{DEFAULT_LISTEN, NODE_ID_BYTES};

#[derive(Parser, Debug, Clone)]
#[command(name = "ledger-node")]
#[command(about = "Proof-of-work ledger node")]
pub struct Args {
    /// Address to listen on, e.g. 127.0.0.1:5000
    #[arg(long, default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// Identity credited with mining rewards (random when omitted)
    #[arg(long)]
    pub node_id: Option<String>,

    /// Peer to register at startup; may be repeated
    #[arg(long = "peer")]
    pub peers: Vec<String>,

    /// Per-peer timeout while resolving consensus, in milliseconds
    #[arg(long, default_value_t = DEFAULT_PEER_TIMEOUT_MS)]
    pub peer_timeout_ms: u64,
}

impl Args {
    pub fn node_config(&self) -> NodeConfig {
        NodeConfig {
            node_id: self.node_id.clone().unwrap_or_else(random_node_id),
            peer_timeout: Duration::from_millis(self.peer_timeout_ms),
        }
    }
}

/// 32 lowercase hex chars.
pub fn random_node_id() -> String {
    let bytes: [u8; NODE_ID_BYTES] = rand::random();
    hex::encode(bytes)
}
