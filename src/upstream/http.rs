// src/upstream/http.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::upstream::types::{Page, TrendingSource, UpstreamError, RATE_LIMIT_STATUS};

pub const DEFAULT_TRENDING_URL: &str = "https://api.stocktwits.com/api/2/streams/trending.json";

/// Trending stream reached over HTTP.
#[derive(Clone)]
pub struct HttpTrendingSource {
    url: String,
    client: Client,
    timeout: Duration,
}

impl HttpTrendingSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

#[async_trait]
impl TrendingSource for HttpTrendingSource {
    async fn fetch_page(&self, max: Option<&str>) -> Result<Page, UpstreamError> {
        let mut req = self.client.get(&self.url).timeout(self.timeout);
        if let Some(max) = max {
            req = req.query(&[("max", max)]);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(Box::new(e)))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| UpstreamError::Transport(Box::new(e)))?;

        // An HTTP 429 is a rate limit whatever the body says.
        if status.as_u16() == RATE_LIMIT_STATUS {
            tracing::debug!(http_status = %status, "http 429, treating as rate limit");
            return Ok(Page::rate_limited());
        }

        let parsed = serde_json::from_str::<Page>(&body);
        if !status.is_success() {
            // Envelope-level throttling still wins; any other failure status aborts the fetch.
            if matches!(&parsed, Ok(p) if p.is_rate_limited()) {
                return parsed.map_err(UpstreamError::Decode);
            }
            tracing::warn!(http_status = %status, source = "stocktwits", "upstream error status");
            return Err(UpstreamError::Status(status.as_u16()));
        }

        match parsed {
            Ok(page) => Ok(page),
            Err(e) => {
                tracing::warn!(error = %e, http_status = %status, source = "stocktwits", "undecodable trending page");
                Err(UpstreamError::Decode(e))
            }
        }
    }

    fn name(&self) -> &'static str {
        "stocktwits"
    }
}
