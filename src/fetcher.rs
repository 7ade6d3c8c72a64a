// src/fetcher.rs
//! Paginated collector: walks the trending stream backwards via the `max`
//! cursor, concatenating pages in request order, then snapshots the result.

use std::sync::Arc;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::error::FetchError;
use crate::snapshot::SnapshotStore;
use crate::upstream::{Message, TrendingSource};

pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("fetch_pages_total", "Upstream pages fetched.");
        describe_counter!("fetch_messages_total", "Messages accumulated by completed fetches.");
        describe_counter!("fetch_rate_limited_total", "Fetches aborted by an upstream 429.");
        describe_counter!("fetch_errors_total", "Fetches aborted by transport/decode errors.");
        describe_counter!(
            "snapshot_write_errors_total",
            "Snapshot writes that failed (non-fatal)."
        );
    });
}

#[derive(Clone)]
pub struct Fetcher {
    source: Arc<dyn TrendingSource>,
    store: Arc<dyn SnapshotStore>,
}

impl Fetcher {
    pub fn new(source: Arc<dyn TrendingSource>, store: Arc<dyn SnapshotStore>) -> Self {
        Self { source, store }
    }

    /// Fetch the first page plus up to `max_iterations` older ones.
    pub async fn fetch(&self, max_iterations: u32) -> Result<Vec<Message>, FetchError> {
        ensure_metrics_described();

        let mut counter: u32 = 0;
        let mut data: Vec<Message> = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = match self.source.fetch_page(cursor.as_deref()).await {
                Ok(p) => p,
                Err(source) => {
                    counter!("fetch_errors_total").increment(1);
                    return Err(FetchError::Upstream {
                        page: counter,
                        source,
                    });
                }
            };
            counter!("fetch_pages_total").increment(1);

            if page.is_rate_limited() {
                counter!("fetch_rate_limited_total").increment(1);
                tracing::warn!(
                    source = self.source.name(),
                    page = counter,
                    discarded = data.len(),
                    "upstream rate limit"
                );
                return Err(FetchError::RateLimited {
                    status: page.status().unwrap_or_default(),
                    page: counter,
                });
            }

            let next = page.next_max().map(str::to_string);
            tracing::debug!(
                page = counter,
                messages = page.messages.len(),
                cursor = ?cursor,
                "page fetched"
            );
            data.extend(page.messages);

            if counter >= max_iterations {
                break;
            }
            match next {
                Some(max) => cursor = Some(max),
                None => {
                    tracing::debug!(page = counter, "no older cursor, stopping early");
                    break;
                }
            }
            counter += 1;
        }

        if let Err(e) = self.store.persist(&data).await {
            counter!("snapshot_write_errors_total").increment(1);
            tracing::warn!(error = ?e, store = %self.store.describe(), "snapshot write failed");
        } else {
            tracing::info!(store = %self.store.describe(), messages = data.len(), "snapshot ready");
        }

        counter!("fetch_messages_total").increment(data.len() as u64);
        Ok(data)
    }
}
