// src/random.rs
//! Synthetic records for demoing the chart without touching the upstream.

use rand::Rng;

use crate::aggregate::AggregateRecord;

const MIN_COMPANIES: usize = 50;
const MAX_COMPANIES: usize = 300;
const MAX_COUNT: u32 = 1000;

/// Three uppercase letters in `A..=Y`.
pub fn random_ticker<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..3).map(|_| rng.random_range(b'A'..b'Z') as char).collect()
}

/// Between 50 and 299 fake companies. Tickers may repeat; nothing downstream relies on uniqueness here.
pub fn random_records<R: Rng + ?Sized>(rng: &mut R) -> Vec<AggregateRecord> {
    let n = rng.random_range(MIN_COMPANIES..MAX_COMPANIES);
    (0..n)
        .map(|_| {
            let ticker = random_ticker(rng);
            AggregateRecord {
                title: format!("{ticker} Corp."),
                name: ticker,
                count: rng.random_range(1..=MAX_COUNT),
            }
        })
        .collect()
}
