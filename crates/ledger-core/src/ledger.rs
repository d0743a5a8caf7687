use crate::{chain::genesis_block, now_secs, Block, LedgerError, Result, Transaction};

/// The chain of settled blocks plus the pool of transactions waiting for the
/// next one. Never empty: construction appends the genesis block.
#[derive(Clone, Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            chain: vec![genesis_block()],
            pending: Vec::new(),
        }
    }

    /// Queues a transaction and returns the index of the block it will land in.
    pub fn add_transaction(&mut self, tx: Transaction) -> u64 {
        self.pending.push(tx);
        self.next_index()
    }

    /// Seals the pending pool into a new block and appends it.
    ///
    /// A missing or empty `previous_hash` is filled in with the hash of the
    /// current last block.
    pub fn create_block(&mut self, proof: u64, previous_hash: Option<&str>) -> Result<Block> {
        let previous_hash = match previous_hash.filter(|h| !h.is_empty()) {
            Some(hash) => hash.to_owned(),
            None => self.previous_block()?.hash(),
        };
        let block = Block {
            index: self.next_index(),
            timestamp: now_secs(),
            transactions: std::mem::take(&mut self.pending),
            proof,
            previous_hash,
        };
        self.chain.push(block.clone());
        Ok(block)
    }

    pub fn previous_block(&self) -> Result<&Block> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    /// Swaps the whole chain. Callers validate `chain` first; the pending pool
    /// is left as is.
    pub fn replace_chain(&mut self, chain: Vec<Block>) {
        debug_assert!(!chain.is_empty(), "replacement chain must hold genesis");
        self.chain = chain;
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    fn next_index(&self) -> u64 {
        self.chain.len() as u64 + 1
    }
}
