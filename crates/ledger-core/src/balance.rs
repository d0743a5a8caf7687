use crate::{Amount, Block};
use serde::{Deserialize, Serialize};

/// Total settled volume above which the volume check reports its condition as met.
pub const VOLUME_THRESHOLD: u64 = 10;

/// A signed running total over transaction amounts.
///
/// Stays integral while every amount seen is an integer and fits; any
/// fractional amount (or an overflow) turns the total into a float.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tally {
    Int(i64),
    Float(f64),
}

impl Default for Tally {
    fn default() -> Self {
        Tally::Int(0)
    }
}

impl Tally {
    pub fn as_f64(self) -> f64 {
        match self {
            Tally::Int(value) => value as f64,
            Tally::Float(value) => value,
        }
    }

    fn credit(self, amount: Amount) -> Self {
        self.apply(amount, false)
    }

    fn debit(self, amount: Amount) -> Self {
        self.apply(amount, true)
    }

    fn apply(self, amount: Amount, negate: bool) -> Self {
        if let (Tally::Int(total), Amount::Int(value)) = (self, amount) {
            let delta = i64::try_from(value)
                .ok()
                .map(|v| if negate { -v } else { v });
            if let Some(sum) = delta.and_then(|d| total.checked_add(d)) {
                return Tally::Int(sum);
            }
        }
        let delta = amount.as_f64();
        Tally::Float(self.as_f64() + if negate { -delta } else { delta })
    }

    fn exceeds(self, threshold: u64) -> bool {
        match self {
            Tally::Int(value) => i128::from(value) > i128::from(threshold),
            Tally::Float(value) => value > threshold as f64,
        }
    }
}

/// Net balance of `address` over settled transactions: credits minus debits.
/// Addresses compare as exact strings.
pub fn balance_of(chain: &[Block], address: &str) -> Tally {
    let mut balance = Tally::default();
    for tx in chain.iter().flat_map(|block| &block.transactions) {
        if tx.recipient == address {
            balance = balance.credit(tx.amount);
        }
        if tx.sender == address {
            balance = balance.debit(tx.amount);
        }
    }
    balance
}

/// Sum of every settled transaction amount, rewards included.
pub fn settled_volume(chain: &[Block]) -> Tally {
    chain
        .iter()
        .flat_map(|block| &block.transactions)
        .fold(Tally::default(), |total, tx| total.credit(tx.amount))
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VolumeCheck {
    pub message: &'static str,
    pub condition: &'static str,
    pub action: &'static str,
    pub status: &'static str,
    pub total: Tally,
}

/// Evaluates the settled-volume rule: met once the total exceeds [`VOLUME_THRESHOLD`].
pub fn volume_check(chain: &[Block]) -> VolumeCheck {
    let total = settled_volume(chain);
    let met = total.exceeds(VOLUME_THRESHOLD);
    VolumeCheck {
        message: "Smart Contract Executed",
        condition: "Total balance > 10",
        action: if met {
            "Reward user with bonus"
        } else {
            "No reward given"
        },
        status: if met {
            "Condition Met"
        } else {
            "Condition Not Met"
        },
        total,
    }
}
