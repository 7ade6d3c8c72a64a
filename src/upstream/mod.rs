// src/upstream/mod.rs
pub mod http;
pub mod mock;
pub mod types;

pub use self::http::{HttpTrendingSource, DEFAULT_TRENDING_URL};
pub use self::types::{Message, Page, SymbolMention, TrendingSource, UpstreamError};
