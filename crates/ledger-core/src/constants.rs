pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
/// Leading zero bits required of a proof digest (four hex zeros).
pub const POW_TARGET_DIFFICULTY: u32 = 16;
/// Nonces searched per parallel window before the cancel flag is checked again.
pub const NONCE_WINDOW: u64 = 1 << 14;
pub const GENESIS_PROOF: u64 = 100;
pub const GENESIS_PREVIOUS_HASH: &str = "1";
pub const REWARD_SENDER: &str = "0";
pub const MINING_REWARD: u64 = 1;
pub const DEFAULT_PEER_TIMEOUT_MS: u64 = 5_000;
