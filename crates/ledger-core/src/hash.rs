//! Canonical block encoding and digest.
//!
//! Blocks are encoded as sorted-key JSON with `", "` / `": "` separators and
//! ASCII-only string escapes, then hashed with SHA-256. Every node on the
//! network has to produce the same bytes for the same block, so the encoder is
//! written out by hand instead of going through a serializer whose map ordering
//! or float formatting could drift between versions.

use std::fmt::Write;

use sha2::{Digest, Sha256};

use crate::{Amount, Block, Transaction};

/// Hex-encoded SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Digest used for `previous_hash` linkage and proof-of-work.
pub fn block_hash(block: &Block) -> String {
    sha256_hex(canonical_block(block).as_bytes())
}

/// The exact byte string that [`block_hash`] digests.
pub fn canonical_block(block: &Block) -> String {
    let mut out = String::with_capacity(160 + block.transactions.len() * 96);
    out.push_str("{\"index\": ");
    out.push_str(&block.index.to_string());
    out.push_str(", \"previous_hash\": ");
    write_str(&mut out, &block.previous_hash);
    out.push_str(", \"proof\": ");
    out.push_str(&block.proof.to_string());
    out.push_str(", \"timestamp\": ");
    write_f64(&mut out, block.timestamp);
    out.push_str(", \"transactions\": [");
    for (i, tx) in block.transactions.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_transaction(&mut out, tx);
    }
    out.push_str("]}");
    out
}

fn write_transaction(out: &mut String, tx: &Transaction) {
    out.push_str("{\"amount\": ");
    match tx.amount {
        Amount::Int(value) => out.push_str(&value.to_string()),
        Amount::Float(value) => write_f64(out, value),
    }
    out.push_str(", \"recipient\": ");
    write_str(out, &tx.recipient);
    out.push_str(", \"sender\": ");
    write_str(out, &tx.sender);
    out.push('}');
}

fn write_str(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{unit:04x}");
                }
            }
        }
    }
    out.push('"');
}

/// Shortest round-trip decimal, `.0` on whole values, exponent written as
/// `e+16` / `e-05`.
fn write_f64(out: &mut String, value: f64) {
    if value.is_nan() {
        out.push_str("NaN");
        return;
    }
    if value.is_infinite() {
        out.push_str(if value > 0.0 { "Infinity" } else { "-Infinity" });
        return;
    }
    let repr = format!("{value:?}");
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            let _ = write!(out, "{mantissa}e{sign}{digits:0>2}");
        }
        None => out.push_str(&repr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HASH_HEX_SIZE;

    fn genesis_at(timestamp: f64) -> Block {
        Block {
            index: 1,
            timestamp,
            transactions: vec![],
            proof: 100,
            previous_hash: "1".to_string(),
        }
    }

    fn block_with_txs() -> Block {
        Block {
            index: 2,
            timestamp: 1_700_000_000.5,
            transactions: vec![
                Transaction::new("A", "B", 5),
                Transaction::new("0", "miner", 1),
            ],
            proof: 4456,
            previous_hash: "525afe96d81a5e16082be3818542c9dab09537ac6e961295c671877fcb12a431"
                .to_string(),
        }
    }

    #[test]
    fn canonical_form_sorts_keys_and_spaces_separators() {
        let encoded = canonical_block(&genesis_at(1_700_000_000.0));
        assert_eq!(
            encoded,
            r#"{"index": 1, "previous_hash": "1", "proof": 100, "timestamp": 1700000000.0, "transactions": []}"#
        );
    }

    #[test]
    fn genesis_digest_matches_reference_vector() {
        let hash = block_hash(&genesis_at(1_700_000_000.0));
        assert_eq!(
            hash,
            "525afe96d81a5e16082be3818542c9dab09537ac6e961295c671877fcb12a431"
        );
        assert_eq!(hash.len(), HASH_HEX_SIZE);
    }

    #[test]
    fn block_with_transactions_matches_reference_vector() {
        let block = block_with_txs();
        assert_eq!(
            canonical_block(&block),
            concat!(
                r#"{"index": 2, "previous_hash": "525afe96d81a5e16082be3818542c9dab09537ac6e961295c671877fcb12a431", "#,
                r#""proof": 4456, "timestamp": 1700000000.5, "transactions": "#,
                r#"[{"amount": 5, "recipient": "B", "sender": "A"}, {"amount": 1, "recipient": "miner", "sender": "0"}]}"#
            )
        );
        assert_eq!(
            block_hash(&block),
            "27c02742dcc2dd0f13e1c75ad1d839d8b4b5bbf460bebb4396bd3de4e9bfe7ce"
        );
    }

    #[test]
    fn fractional_amount_matches_reference_vector() {
        let mut block = block_with_txs();
        block.transactions[0] = Transaction::with_amount("A", "B", Amount::Float(2.5));
        assert_eq!(
            canonical_block(&block),
            concat!(
                r#"{"index": 2, "previous_hash": "525afe96d81a5e16082be3818542c9dab09537ac6e961295c671877fcb12a431", "#,
                r#""proof": 4456, "timestamp": 1700000000.5, "transactions": "#,
                r#"[{"amount": 2.5, "recipient": "B", "sender": "A"}, {"amount": 1, "recipient": "miner", "sender": "0"}]}"#
            )
        );
        assert_eq!(
            block_hash(&block),
            "4a49e2354fd2fc99b2be84f2b0ff3266a8da4213045a3fb3fa89fe966cb4cfdf"
        );

        block.transactions[0].amount = Amount::Float(5.0);
        assert!(canonical_block(&block).contains(r#"{"amount": 5.0, "recipient": "B""#));
        assert_ne!(block_hash(&block), block_hash(&block_with_txs()));
    }

    #[test]
    fn non_ascii_and_control_chars_are_escaped() {
        let block = Block {
            index: 3,
            timestamp: 1_700_000_123.25,
            transactions: vec![Transaction::new("Zoë", "🚀 \"x\"\n\u{7f}", 7)],
            proof: 0,
            previous_hash: "1".to_string(),
        };
        let encoded = canonical_block(&block);
        assert!(encoded.contains(r#""recipient": "\ud83d\ude80 \"x\"\n\u007f""#));
        assert!(encoded.contains(r#""sender": "Zo\u00eb""#));
        assert_eq!(
            block_hash(&block),
            "2cf13c3dcece37e4f5007b4f2d48dc36cf36eb6cba42d199d0a921c46160484b"
        );
    }

    #[test]
    fn float_formatting_follows_shortest_repr() {
        let cases = [
            (1_700_000_000.0, "1700000000.0"),
            (0.5, "0.5"),
            (1_700_000_000.123_456, "1700000000.123456"),
            (1e16, "1e+16"),
            (1.5e-5, "1.5e-05"),
            (-0.0, "-0.0"),
        ];
        for (value, expected) in cases {
            let mut out = String::new();
            write_f64(&mut out, value);
            assert_eq!(out, expected, "formatting {value:?}");
        }
    }

    #[test]
    fn hash_is_stable_and_field_sensitive() {
        let block = block_with_txs();
        let base = block_hash(&block);
        assert_eq!(base, block_hash(&block));

        let mut changed = block.clone();
        changed.index += 1;
        assert_ne!(base, block_hash(&changed));

        let mut changed = block.clone();
        changed.timestamp += 0.001;
        assert_ne!(base, block_hash(&changed));

        let mut changed = block.clone();
        changed.proof += 1;
        assert_ne!(base, block_hash(&changed));

        let mut changed = block.clone();
        changed.previous_hash.push('0');
        assert_ne!(base, block_hash(&changed));

        let mut changed = block.clone();
        changed.transactions[0].amount = Amount::Int(6);
        assert_ne!(base, block_hash(&changed));

        let mut changed = block;
        changed.transactions.swap(0, 1);
        assert_ne!(base, block_hash(&changed));
    }
}
