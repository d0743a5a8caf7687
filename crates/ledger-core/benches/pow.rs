use criterion::{criterion_group, criterion_main, Criterion};
use ledger_core::{mine::proof_of_work, Block, Transaction};
use std::sync::atomic::AtomicBool;

fn bench_pow(c: &mut Criterion) {
    c.bench_function("proof_of_work_16_bits", |b| {
        let txs: Vec<Transaction> = (0..10)
            .map(|i| Transaction::new(format!("alice-{i}"), "bob", i + 1))
            .collect();
        let previous = Block {
            index: 1,
            timestamp: 1_700_000_000.0,
            transactions: txs,
            proof: 100,
            previous_hash: "1".to_string(),
        };
        let cancel = AtomicBool::new(false);

        b.iter(|| {
            let _proof = proof_of_work(&previous, &cancel);
        });
    });

    c.bench_function("block_hash_10_txs", |b| {
        let previous = Block {
            index: 7,
            timestamp: 1_700_000_000.25,
            transactions: (0..10)
                .map(|i| Transaction::new("alice", format!("bob-{i}"), i))
                .collect(),
            proof: 35_293,
            previous_hash: "1".to_string(),
        };
        b.iter(|| previous.hash());
    });
}

criterion_group!(benches, bench_pow);
criterion_main!(benches);
