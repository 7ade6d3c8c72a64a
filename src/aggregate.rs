// src/aggregate.rs
//! Mention counting for the circle-packing view.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::upstream::Message;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregateRecord {
    pub name: String,
    pub count: u32,
    pub title: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Order in which tickers were first encountered.
    #[default]
    FirstSeen,
    /// Highest count first; ties keep first-seen order.
    #[serde(alias = "count")]
    CountDesc,
}

/// Count symbol mentions per ticker, in first-seen order.
///
/// A ticker listed twice in one message counts twice. Messages without
/// `symbols` and mentions without a ticker contribute nothing.
pub fn aggregate(messages: &[Message]) -> Vec<AggregateRecord> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<AggregateRecord> = Vec::new();

    for mention in messages.iter().filter_map(|m| m.symbols.as_ref()).flatten() {
        let Some(ticker) = mention.symbol.as_deref() else {
            continue;
        };
        match index.get(ticker) {
            Some(&i) => out[i].count += 1,
            None => {
                index.insert(ticker, out.len());
                out.push(AggregateRecord {
                    name: ticker.to_string(),
                    count: 1,
                    title: mention.title.clone().unwrap_or_default(),
                });
            }
        }
    }

    out
}

pub fn aggregate_with(messages: &[Message], order: SortOrder) -> Vec<AggregateRecord> {
    let mut records = aggregate(messages);
    if order == SortOrder::CountDesc {
        // stable: equal counts stay in first-seen order
        records.sort_by(|a, b| b.count.cmp(&a.count));
    }
    records
}

/// Caption data for the chart.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageStats {
    pub message_count: usize,
    pub min_date: Option<DateTime<Utc>>,
    pub max_date: Option<DateTime<Utc>>,
}

impl MessageStats {
    /// Unparseable or missing `created_at` values are ignored for the date range.
    pub fn from_messages(messages: &[Message]) -> Self {
        let mut dates = messages
            .iter()
            .filter_map(|m| m.created_at.as_deref())
            .filter_map(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc));

        let first = dates.next();
        let (min_date, max_date) = dates.fold((first, first), |(lo, hi), d| {
            (lo.map(|l| l.min(d)), hi.map(|h| h.max(d)))
        });

        Self {
            message_count: messages.len(),
            min_date,
            max_date,
        }
    }
}
