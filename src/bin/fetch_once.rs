//! One-shot fetch: pages through the trending stream with the configured
//! settings, writes the `/stocktwits` snapshot and prints aggregated records.
//!
//! Usage: `fetch_once [--sort count|first_seen]`

use std::sync::Arc;

use anyhow::{bail, Context};
use cashtag_trends::config::AppConfig;
use cashtag_trends::snapshot::FileSnapshotStore;
use cashtag_trends::upstream::HttpTrendingSource;
use cashtag_trends::{aggregate_with, Fetcher, MessageStats, SortOrder};

fn parse_sort() -> anyhow::Result<SortOrder> {
    let mut args = std::env::args().skip(1);
    let mut sort = SortOrder::FirstSeen;
    while let Some(a) = args.next() {
        match a.as_str() {
            "--sort" => {
                let v = args.next().context("--sort needs a value")?;
                sort = serde_json::from_value(serde_json::Value::String(v))
                    .context("--sort expects count or first_seen")?;
            }
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(sort)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let sort = parse_sort()?;
    let cfg = AppConfig::load()?;
    let source = HttpTrendingSource::new(cfg.upstream_url.clone()).with_timeout(cfg.timeout_secs);
    let store = FileSnapshotStore::new(cfg.stocktwits_snapshot.clone());
    let fetcher = Fetcher::new(Arc::new(source), Arc::new(store));

    let messages = fetcher.fetch(cfg.max_iterations).await?;
    let stats = MessageStats::from_messages(&messages);
    tracing::info!(
        messages = stats.message_count,
        min = ?stats.min_date,
        max = ?stats.max_date,
        "fetch complete"
    );

    let records = aggregate_with(&messages, sort);
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
