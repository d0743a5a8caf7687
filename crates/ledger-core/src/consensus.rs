//! Longest-valid-chain fork resolution.
//!
//! Every registered peer is asked for its chain concurrently, each request
//! bounded by its own timeout. Answers are then weighed in registration order:
//! a peer replaces the current best candidate only if its chain is strictly
//! longer and passes [`check_chain`]. On equal lengths the peer registered
//! first wins. Peers that fail in any way are logged and skipped; resolution
//! itself never fails.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{validate::check_chain, Block, LedgerError, Result};

/// Body of `GET /chain`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
    pub length: u64,
}

impl ChainResponse {
    pub fn new(chain: Vec<Block>) -> Self {
        let length = chain.len() as u64;
        Self { chain, length }
    }
}

/// Outcome of a consensus round: whether the chain was swapped, and the
/// chain that is authoritative afterwards.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Resolution {
    pub replaced: bool,
    pub chain: Vec<Block>,
}

/// Transport used to ask a peer for its chain.
pub trait PeerClient: Clone + Send + Sync + 'static {
    /// Any failure (transport, status, decoding) is reported as
    /// [`LedgerError::UnreachablePeer`].
    fn fetch_chain(&self, peer: &str) -> impl Future<Output = Result<ChainResponse>> + Send;
}

#[derive(Clone, Debug)]
pub struct ConsensusResolver<C> {
    client: C,
    peer_timeout: Duration,
}

impl<C: PeerClient> ConsensusResolver<C> {
    pub fn new(client: C, peer_timeout: Duration) -> Self {
        Self {
            client,
            peer_timeout,
        }
    }

    /// Returns the longest valid chain reported by `peers` that is strictly
    /// longer than `local_len`, if any.
    pub async fn resolve(&self, local_len: usize, peers: &[String]) -> Option<Vec<Block>> {
        let requests: Vec<_> = peers
            .iter()
            .map(|peer| {
                let client = self.client.clone();
                let owned = peer.clone();
                let timeout = self.peer_timeout;
                let handle =
                    tokio::spawn(async move { fetch_with_timeout(&client, &owned, timeout).await });
                (peer, handle)
            })
            .collect();

        let mut best_len = local_len as u64;
        let mut best = None;
        for (peer, handle) in requests {
            let response = match handle.await {
                Ok(Ok(response)) => response,
                Ok(Err(err)) => {
                    warn!(%peer, %err, "skipping peer");
                    continue;
                }
                Err(err) => {
                    warn!(%peer, %err, "peer request task failed");
                    continue;
                }
            };

            if response.length != response.chain.len() as u64 {
                warn!(
                    %peer,
                    reported = response.length,
                    actual = response.chain.len(),
                    "skipping peer with inconsistent chain length"
                );
                continue;
            }
            if response.length <= best_len {
                debug!(%peer, length = response.length, best_len, "peer chain not longer");
                continue;
            }
            if let Err(err) = check_chain(&response.chain) {
                warn!(%peer, %err, "skipping peer with invalid chain");
                continue;
            }

            debug!(%peer, length = response.length, "new best candidate chain");
            best_len = response.length;
            best = Some(response.chain);
        }
        best
    }
}

async fn fetch_with_timeout<C: PeerClient>(
    client: &C,
    peer: &str,
    timeout: Duration,
) -> Result<ChainResponse> {
    match tokio::time::timeout(timeout, client.fetch_chain(peer)).await {
        Ok(result) => result,
        Err(_) => Err(LedgerError::UnreachablePeer {
            peer: peer.to_owned(),
            reason: format!("no answer within {timeout:?}"),
        }),
    }
}
