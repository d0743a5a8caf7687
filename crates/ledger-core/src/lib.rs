use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

pub mod balance;
pub mod consensus;
pub mod constants;
pub mod error;
pub mod hash;
pub mod ledger;
pub mod mine;
pub mod peers;
pub mod service;
pub mod validate;

pub use error::{LedgerError, Result};
pub use ledger::Ledger;

pub type Hash = [u8; 32];

/// A non-negative transaction amount.
///
/// Integers and floats are kept apart because they hash differently: `5`
/// and `5.0` are distinct amounts on the wire.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Amount {
    Int(u64),
    Float(f64),
}

impl Amount {
    pub fn as_f64(self) -> f64 {
        match self {
            Amount::Int(value) => value as f64,
            Amount::Float(value) => value,
        }
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount::Int(value)
    }
}

impl TryFrom<f64> for Amount {
    type Error = LedgerError;

    fn try_from(value: f64) -> Result<Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(Amount::Float(value))
        } else {
            Err(LedgerError::InvalidAmount(value.to_string()))
        }
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match *self {
            Amount::Int(value) => serializer.serialize_u64(value),
            Amount::Float(value) => serializer.serialize_f64(value),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct AmountVisitor;

        impl de::Visitor<'_> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative number")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<Amount, E> {
                Ok(Amount::Int(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<Amount, E> {
                u64::try_from(value)
                    .map(Amount::Int)
                    .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<Amount, E> {
                Amount::try_from(value)
                    .map_err(|_| E::invalid_value(de::Unexpected::Float(value), &self))
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: Amount,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: u64) -> Self {
        Self::with_amount(sender, recipient, Amount::from(amount))
    }

    pub fn with_amount(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: Amount,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    /// Coinbase-style credit for whoever completed the proof-of-work.
    pub fn reward(miner: impl Into<String>) -> Self {
        Self::new(constants::REWARD_SENDER, miner, constants::MINING_REWARD)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    pub fn hash(&self) -> String {
        hash::block_hash(self)
    }
}

/// Seconds since the Unix epoch with sub-second precision.
pub fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

pub mod pow {
    use super::Hash;
    use crate::constants::POW_TARGET_DIFFICULTY;
    use sha2::{Digest, Sha256};

    /// SHA-256 of `"{last_proof}{proof}{last_hash}"`, no separators.
    pub fn proof_digest(last_proof: u64, proof: u64, last_hash: &str) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(format!("{last_proof}{proof}{last_hash}").as_bytes());
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest[..]);
        out
    }

    /// True when the proof digest starts with four hex zeros.
    pub fn valid_proof(last_proof: u64, proof: u64, last_hash: &str) -> bool {
        count_leading_zero_bits(&proof_digest(last_proof, proof, last_hash))
            >= POW_TARGET_DIFFICULTY
    }

    pub fn count_leading_zero_bits(hash: &Hash) -> u32 {
        let mut total = 0u32;
        for b in hash {
            if *b == 0 {
                total += 8;
            } else {
                total += b.leading_zeros();
                break;
            }
        }
        total
    }
}

pub mod chain {
    use super::*;
    use crate::constants::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF};

    /// A zero-transaction genesis block with the `"1"` sentinel as prev-hash.
    pub fn genesis_block() -> Block {
        Block {
            index: 1,
            timestamp: now_secs(),
            transactions: vec![],
            proof: GENESIS_PROOF,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
        }
    }
}
