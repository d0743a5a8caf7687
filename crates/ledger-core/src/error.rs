use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("invalid peer address: {0:?}")]
    InvalidPeerAddress(String),

    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("peer {peer} unreachable: {reason}")]
    UnreachablePeer { peer: String, reason: String },

    #[error("invalid chain at block {index}")]
    InvalidChain { index: u64 },

    #[error("chain is empty")]
    EmptyChain,

    #[error("mining cancelled")]
    MiningCancelled,
}

pub type Result<T> = std::result::Result<T, LedgerError>;
