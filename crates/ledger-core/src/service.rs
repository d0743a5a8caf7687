//! The operations a node exposes, over a ledger guarded by a single-writer lock.
//!
//! Proof-of-work runs on the blocking pool against a snapshot of the tip and
//! never holds the lock; only sealing the block takes the write guard. Peer
//! polling during consensus likewise runs unlocked.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::balance::{balance_of, volume_check, Tally, VolumeCheck};
use crate::consensus::{ChainResponse, ConsensusResolver, PeerClient, Resolution};
use crate::constants::DEFAULT_PEER_TIMEOUT_MS;
use crate::mine::proof_of_work;
use crate::peers::PeerRegistry;
use crate::{Amount, Block, Ledger, LedgerError, Result, Transaction};

#[derive(Clone, Debug)]
pub struct NodeConfig {
    /// Recipient of mining rewards.
    pub node_id: String,
    pub peer_timeout: Duration,
}

impl NodeConfig {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            peer_timeout: Duration::from_millis(DEFAULT_PEER_TIMEOUT_MS),
        }
    }
}

/// Incoming transaction; every field is required.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<Amount>,
}

impl TransactionRequest {
    pub fn into_transaction(self) -> Result<Transaction> {
        Ok(Transaction {
            sender: self.sender.ok_or(LedgerError::MissingField("sender"))?,
            recipient: self.recipient.ok_or(LedgerError::MissingField("recipient"))?,
            amount: self.amount.ok_or(LedgerError::MissingField("amount"))?,
        })
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RegisterPeersRequest {
    pub nodes: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub address: String,
    pub balance: Tally,
}

#[derive(Clone)]
pub struct NodeService<C> {
    ledger: Arc<RwLock<Ledger>>,
    peers: Arc<RwLock<PeerRegistry>>,
    resolver: ConsensusResolver<C>,
    node_id: Arc<str>,
    shutdown: Arc<AtomicBool>,
}

impl<C: PeerClient> NodeService<C> {
    pub fn new(config: NodeConfig, client: C) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(Ledger::new())),
            peers: Arc::new(RwLock::new(PeerRegistry::new())),
            resolver: ConsensusResolver::new(client, config.peer_timeout),
            node_id: config.node_id.into(),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Solves proof-of-work on the current tip, credits the mining reward and
    /// seals the pending pool into a new block.
    ///
    /// If the tip moves while searching (another block mined, or the chain
    /// replaced by consensus) the search restarts on the new tip.
    pub async fn mine(&self) -> Result<Block> {
        loop {
            let previous = self.ledger.read().await.previous_block()?.clone();

            let snapshot = previous.clone();
            let cancel = Arc::clone(&self.shutdown);
            let proof = tokio::task::spawn_blocking(move || proof_of_work(&snapshot, &cancel))
                .await
                .map_err(|_| LedgerError::MiningCancelled)?
                .ok_or(LedgerError::MiningCancelled)?;

            let mut ledger = self.ledger.write().await;
            if ledger.previous_block()? != &previous {
                debug!(index = previous.index, "tip moved during proof-of-work, mining again");
                continue;
            }
            let previous_hash = previous.hash();
            ledger.add_transaction(Transaction::reward(&*self.node_id));
            let block = ledger.create_block(proof, Some(&previous_hash))?;
            info!(
                index = block.index,
                proof,
                txs = block.transactions.len(),
                "New block forged"
            );
            return Ok(block);
        }
    }

    pub async fn get_chain(&self) -> ChainResponse {
        ChainResponse::new(self.ledger.read().await.chain().to_vec())
    }

    /// Queues a transaction; returns the index of the block it will land in.
    pub async fn submit_transaction(&self, request: TransactionRequest) -> Result<u64> {
        let tx = request.into_transaction()?;
        let index = self.ledger.write().await.add_transaction(tx);
        debug!(index, "transaction queued");
        Ok(index)
    }

    pub async fn pending(&self) -> Vec<Transaction> {
        self.ledger.read().await.pending().to_vec()
    }

    pub async fn get_balance(&self, address: &str) -> BalanceResponse {
        let balance = balance_of(self.ledger.read().await.chain(), address);
        BalanceResponse {
            address: address.to_owned(),
            balance,
        }
    }

    pub async fn volume_check(&self) -> VolumeCheck {
        volume_check(self.ledger.read().await.chain())
    }

    /// Registers a non-empty list of peers; returns the full peer set.
    pub async fn register_peers(&self, request: RegisterPeersRequest) -> Result<Vec<String>> {
        let nodes = request
            .nodes
            .filter(|nodes| !nodes.is_empty())
            .ok_or(LedgerError::MissingField("nodes"))?;
        let mut peers = self.peers.write().await;
        peers.register_all(nodes.as_slice())?;
        Ok(peers.peers().to_vec())
    }

    pub async fn peers(&self) -> Vec<String> {
        self.peers.read().await.peers().to_vec()
    }

    /// Adopts the longest valid peer chain if it is strictly longer than ours.
    pub async fn resolve_consensus(&self) -> Resolution {
        let local_len = self.ledger.read().await.len();
        let peers = self.peers().await;

        let candidate = self.resolver.resolve(local_len, &peers).await;

        let mut ledger = self.ledger.write().await;
        let replaced = match candidate {
            Some(chain) if chain.len() > ledger.len() => {
                info!(from = ledger.len(), to = chain.len(), "Replaced chain");
                ledger.replace_chain(chain);
                true
            }
            Some(_) => {
                debug!("local chain grew past the candidate while resolving");
                false
            }
            None => false,
        };
        Resolution {
            replaced,
            chain: ledger.chain().to_vec(),
        }
    }

    /// Stops in-flight and future proof-of-work searches.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}
