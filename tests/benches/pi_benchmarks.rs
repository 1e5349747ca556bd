//! # Pi Plugin Benchmarks
//!
//! | Area | Operation | Expectation |
//! |------|-----------|-------------|
//! | Derivation | `proposal_status` over a billing history | pure, no allocation on the happy path |
//! | Codec | encode + digest-checked decode of one change | dominated by sha256 |
//! | Cache | FIFO insert with eviction | O(1) per insert |
//! | Summary | cached terminal status through the service | no backend I/O |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pi_plugin::{
    proposal_status, BillingStatus, BillingStatusChange, BillingStatusCodec, PiConfig,
    PiPluginApi, ProposalStatus, RecordState, RecordStatus, ResultCache, Token, VoteStatus,
};
use pi_tests::fixtures::PiFixture;
use rand::Rng;
use std::time::Duration;

fn change(n: i64, status: BillingStatus) -> BillingStatusChange {
    BillingStatusChange {
        token: Token::new([7; 8]).to_hex(),
        status,
        reason: "milestone review".into(),
        public_key: "ab".repeat(32),
        signature: "cd".repeat(64),
        timestamp: 1_700_000_000 + n,
        receipt: "ef".repeat(64),
    }
}

fn history(len: usize) -> Vec<BillingStatusChange> {
    (0..len)
        .map(|n| {
            let status = if n % 2 == 0 {
                BillingStatus::Closed
            } else {
                BillingStatus::Active
            };
            change(n as i64, status)
        })
        .collect()
}

fn bench_status_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("pi-status-derivation");

    for len in [0usize, 1, 8, 64] {
        let h = history(len);
        group.bench_with_input(BenchmarkId::new("approved_with_history", len), &h, |b, h| {
            b.iter(|| {
                black_box(proposal_status(
                    RecordState::Vetted,
                    RecordStatus::Public,
                    VoteStatus::Approved,
                    None,
                    h,
                ))
            })
        });
    }

    group.bench_function("censored", |b| {
        b.iter(|| {
            black_box(proposal_status(
                RecordState::Vetted,
                RecordStatus::Censored,
                VoteStatus::Invalid,
                None,
                &[],
            ))
        })
    });

    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("pi-codec");
    let codec = BillingStatusCodec::new("pi");
    let bsc = change(0, BillingStatus::Completed);

    group.bench_function("encode", |b| b.iter(|| black_box(codec.encode(&bsc))));

    let blob = match codec.encode(&bsc) {
        Ok(blob) => blob,
        Err(e) => panic!("encode failed: {}", e),
    };
    group.bench_function("decode_verified", |b| {
        b.iter(|| black_box(codec.decode(&blob)))
    });

    group.finish();
}

fn bench_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("pi-cache");

    for capacity in [16usize, 1_000] {
        let tokens: Vec<Token> = {
            let mut rng = rand::thread_rng();
            (0..capacity * 4).map(|_| Token::new(rng.gen())).collect()
        };

        group.throughput(Throughput::Elements(tokens.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("insert_with_eviction", capacity),
            &tokens,
            |b, tokens| {
                b.iter(|| {
                    let cache = ResultCache::new(capacity);
                    for t in tokens {
                        cache.set_proposal_status(*t, ProposalStatus::Rejected);
                    }
                    black_box(cache.len())
                })
            },
        );
    }

    group.finish();
}

fn bench_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("pi-summary");
    group.measurement_time(Duration::from_secs(5));

    let rt = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(rt) => rt,
        Err(e) => panic!("runtime: {}", e),
    };
    let fx = PiFixture::new(PiConfig::default());

    let cached = PiFixture::token(0x01);
    fx.proposal(cached, RecordState::Vetted, RecordStatus::Public, VoteStatus::Rejected);
    let billed = PiFixture::token(0x02);
    fx.approved_proposal(billed);
    rt.block_on(async {
        let _ = fx.summary_status(cached).await;
        let _ = fx
            .set_billing_status(billed, BillingStatus::Completed, "")
            .await;
    });

    group.bench_function("terminal_from_cache", |b| {
        b.iter(|| black_box(rt.block_on(fx.service.summary(&cached))))
    });
    group.bench_function("billed_proposal", |b| {
        b.iter(|| black_box(rt.block_on(fx.service.summary(&billed))))
    });

    group.finish();
}

criterion_group!(
    name = pi_benches;
    config = Criterion::default().sample_size(50);
    targets =
        bench_status_derivation,
        bench_codec,
        bench_cache,
        bench_summary,
);

criterion_main!(pi_benches);
