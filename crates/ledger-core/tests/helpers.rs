#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use ledger_core::consensus::{ChainResponse, PeerClient};
use ledger_core::mine::proof_of_work;
use ledger_core::{Block, Ledger, LedgerError, Result, Transaction};

/// What a fake peer does when asked for its chain.
#[derive(Clone, Debug)]
pub enum MockPeer {
    Serves(ChainResponse),
    Slow(Duration, ChainResponse),
    Down,
}

#[derive(Clone, Default)]
pub struct MockPeers {
    peers: Arc<HashMap<String, MockPeer>>,
}

impl MockPeers {
    pub fn new(peers: Vec<(&str, MockPeer)>) -> Self {
        let peers = peers
            .into_iter()
            .map(|(addr, peer)| (addr.to_string(), peer))
            .collect();
        Self {
            peers: Arc::new(peers),
        }
    }
}

impl PeerClient for MockPeers {
    async fn fetch_chain(&self, peer: &str) -> Result<ChainResponse> {
        match self.peers.get(peer).cloned() {
            Some(MockPeer::Serves(response)) => Ok(response),
            Some(MockPeer::Slow(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            Some(MockPeer::Down) | None => Err(LedgerError::UnreachablePeer {
                peer: peer.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

/// Mines `blocks` blocks on top of `ledger`, crediting `miner` each time.
pub fn mine_blocks(ledger: &mut Ledger, blocks: usize, miner: &str) {
    let cancel = AtomicBool::new(false);
    for _ in 0..blocks {
        let previous = ledger.previous_block().unwrap().clone();
        let proof = proof_of_work(&previous, &cancel).unwrap();
        ledger.add_transaction(Transaction::reward(miner));
        ledger.create_block(proof, Some(&previous.hash())).unwrap();
    }
}

/// A fresh chain with `blocks` mined blocks after genesis.
pub fn mined_chain(blocks: usize, miner: &str) -> Vec<Block> {
    let mut ledger = Ledger::new();
    mine_blocks(&mut ledger, blocks, miner);
    ledger.chain().to_vec()
}

pub fn serves(chain: &[Block]) -> MockPeer {
    MockPeer::Serves(ChainResponse::new(chain.to_vec()))
}
