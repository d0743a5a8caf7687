use crate::{constants::NONCE_WINDOW, pow::valid_proof, Block};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Finds the smallest proof `p` such that `valid_proof(previous.proof, p, hash(previous))`.
///
/// Nonces are scanned in windows of [`NONCE_WINDOW`]; each window is searched in
/// parallel with `find_first`, so the answer does not depend on thread
/// scheduling. `cancel` is polled between windows and `None` is returned once
/// it is set.
pub fn proof_of_work(previous: &Block, cancel: &AtomicBool) -> Option<u64> {
    let last_proof = previous.proof;
    let last_hash = previous.hash();

    let proof = search(cancel, |proof| valid_proof(last_proof, proof, &last_hash))?;
    info!(
        "Found proof {} on top of block {} ({})",
        proof, previous.index, last_hash
    );
    Some(proof)
}

/// Smallest nonce accepted by `is_valid`, scanned window by window.
fn search<F>(cancel: &AtomicBool, is_valid: F) -> Option<u64>
where
    F: Fn(u64) -> bool + Sync,
{
    let mut start = 0u64;
    loop {
        if cancel.load(Ordering::Relaxed) {
            debug!(after = start, "proof-of-work cancelled");
            return None;
        }

        let end = start.saturating_add(NONCE_WINDOW);
        let found = (start..end)
            .into_par_iter()
            .find_first(|proof| is_valid(*proof));

        if found.is_some() {
            return found;
        }
        if end == u64::MAX {
            return None;
        }
        start = end;
    }
}
