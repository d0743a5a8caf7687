use crate::{pow::valid_proof, Block, LedgerError, Result};

/// Walks `chain` checking hash linkage and proof-of-work for every adjacent
/// pair. The error carries the 1-based position of the first bad block.
///
/// The genesis block itself is not inspected; an empty chain is rejected.
pub fn check_chain(chain: &[Block]) -> Result<()> {
    if chain.is_empty() {
        return Err(LedgerError::EmptyChain);
    }
    for (position, pair) in chain.windows(2).enumerate() {
        let (prev, cur) = (&pair[0], &pair[1]);
        let prev_hash = prev.hash();
        if cur.previous_hash != prev_hash || !valid_proof(prev.proof, cur.proof, &prev_hash) {
            return Err(LedgerError::InvalidChain {
                index: position as u64 + 2,
            });
        }
    }
    Ok(())
}

pub fn valid_chain(chain: &[Block]) -> bool {
    check_chain(chain).is_ok()
}
