// src/upstream/types.rs
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Envelope status the upstream uses to signal throttling.
pub const RATE_LIMIT_STATUS: u16 = 429;

/// One trending message. Only the fields the aggregation needs are typed;
/// everything else is carried through untouched so snapshots stay raw.
/// Typed fields holding the wrong JSON type read as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Message {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_symbols", skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Vec<SymbolMention>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SymbolMention {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    /// Convenience for tests and the demo data: a message mentioning `(ticker, title)` pairs.
    pub fn with_symbols<I, S, T>(symbols: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let symbols = symbols
            .into_iter()
            .map(|(s, t)| SymbolMention {
                symbol: Some(s.into()),
                title: Some(t.into()),
                extra: Map::new(),
            })
            .collect();
        Self {
            created_at: None,
            symbols: Some(symbols),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseMeta {
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cursor {
    #[serde(default, deserialize_with = "opaque_token")]
    pub max: Option<String>,
    #[serde(default, deserialize_with = "opaque_token")]
    pub since: Option<String>,
    #[serde(default)]
    pub more: Option<bool>,
}

/// A single page of the trending stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Page {
    #[serde(default)]
    pub response: Option<ResponseMeta>,
    #[serde(default, deserialize_with = "lenient_messages")]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub cursor: Option<Cursor>,
}

impl Page {
    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().and_then(|r| r.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(RATE_LIMIT_STATUS)
    }

    /// Token to request the next (older) page, if the upstream handed one out.
    pub fn next_max(&self) -> Option<&str> {
        self.cursor.as_ref().and_then(|c| c.max.as_deref())
    }

    /// Envelope the HTTP source synthesizes when a 429 comes back without a readable body.
    pub fn rate_limited() -> Self {
        Self {
            response: Some(ResponseMeta {
                status: Some(RATE_LIMIT_STATUS),
            }),
            messages: Vec::new(),
            cursor: None,
        }
    }
}

/// Cursor tokens arrive as JSON numbers, but the crate treats them as opaque.
fn opaque_token<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(de)?;
    Ok(match v {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_status<'de, D>(de: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(de)?;
    Ok(v.as_ref()
        .and_then(Value::as_u64)
        .and_then(|n| u16::try_from(n).ok()))
}

/// Keep only the object entries; anything else in the list is dropped.
fn objects_of<T: serde::de::DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect()
}

fn lenient_symbols<'de, D>(de: D) -> Result<Option<Vec<SymbolMention>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::Array(items)) => Some(objects_of(items)),
        _ => None,
    })
}

fn lenient_messages<'de, D>(de: D) -> Result<Vec<Message>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::Array(items)) => objects_of(items),
        _ => Vec::new(),
    })
}

/// Parse a saved snapshot (a JSON array of messages), skipping non-object entries.
pub fn messages_from_slice(raw: &[u8]) -> serde_json::Result<Vec<Message>> {
    let items: Vec<Value> = serde_json::from_slice(raw)?;
    Ok(objects_of(items))
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("transport failure: {0}")]
    Transport(#[source] BoxError),
    #[error("malformed body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("upstream answered HTTP {0}")]
    Status(u16),
}

#[async_trait::async_trait]
pub trait TrendingSource: Send + Sync {
    /// Fetch one page, optionally only messages older than `max`.
    async fn fetch_page(&self, max: Option<&str>) -> Result<Page, UpstreamError>;
    fn name(&self) -> &'static str;
}
