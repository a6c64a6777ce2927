//! Document store access.
//!
//! [`DocumentStore`] is the seam the range adapter talks through.
//! [`ElasticsearchStore`] implements it over the Elasticsearch `_search`
//! REST API; tests substitute an in-memory fake.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::config::http_base_url;
use crate::error::{Error, StoreError};
use crate::window::TimeWindow;

/// Field every indexed document is timestamped with.
pub const TIMESTAMP_FIELD: &str = "@timestamp";

/// Documents whose [`TIMESTAMP_FIELD`] falls in `window`, newest first.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeQuery {
    pub collection: String,
    pub window: TimeWindow,
    pub size: usize,
}

/// Matches of a [`RangeQuery`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchHits {
    /// Total matches reported by the store. May exceed `documents.len()`.
    pub total: u64,
    /// Source fields of the returned documents, in store order.
    pub documents: Vec<Value>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// One round trip. Never retried.
    async fn search(&self, query: &RangeQuery) -> Result<SearchHits, StoreError>;

    /// Cheap reachability check for readiness probes.
    async fn ping(&self) -> Result<(), StoreError>;
}

// ── Elasticsearch ─────────────────────────────────────────────────────────────

/// [`DocumentStore`] backed by an Elasticsearch (or OpenSearch) cluster.
pub struct ElasticsearchStore {
    client: Client,
    base: String,
}

impl ElasticsearchStore {
    /// `base` is the cluster URL, e.g. `http://localhost:9200`.
    pub fn new(client: Client, base: &str) -> Result<Self, Error> {
        Ok(Self { client, base: http_base_url(base)? })
    }

    fn search_body(query: &RangeQuery) -> Value {
        let bounds = json!({
            "gte": query.window.start_iso(),
            "lte": query.window.end_iso(),
        });
        json!({
            "size": query.size,
            "query": {
                "bool": {
                    "must": [{ "range": on_timestamp(bounds) }]
                }
            },
            "sort": [on_timestamp(json!({ "order": "desc" }))],
        })
    }
}

#[async_trait]
impl DocumentStore for ElasticsearchStore {
    async fn search(&self, query: &RangeQuery) -> Result<SearchHits, StoreError> {
        let url = format!("{}/{}/_search", self.base, query.collection);
        debug!(%url, size = query.size, "store search");

        let resp = self.client.post(&url).json(&Self::search_body(query)).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(StoreError::Status { status: status.as_u16(), reason: error_reason(&body) });
        }
        parse_search_response(&body)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let resp = self.client.get(&self.base).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(StoreError::Status { status: status.as_u16(), reason: error_reason(&body) })
    }
}

/// `{ TIMESTAMP_FIELD: value }`
fn on_timestamp(value: Value) -> Value {
    Value::Object(Map::from_iter([(TIMESTAMP_FIELD.to_owned(), value)]))
}

// ── Response shape ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Deserialize)]
struct Hits {
    #[serde(default)]
    total: Option<Total>,
    #[serde(default)]
    hits: Vec<Hit>,
}

/// Elasticsearch 7+ reports `{"value": N, "relation": "eq"}`, older
/// versions a bare number.
#[derive(Deserialize)]
#[serde(untagged)]
enum Total {
    Count(u64),
    Object { value: u64 },
}

#[derive(Deserialize)]
struct Hit {
    #[serde(rename = "_source", default)]
    source: Value,
}

pub(crate) fn parse_search_response(body: &str) -> Result<SearchHits, StoreError> {
    let resp: SearchResponse =
        serde_json::from_str(body).map_err(|e| StoreError::Decode(e.to_string()))?;

    let total = match resp.hits.total {
        Some(Total::Count(n) | Total::Object { value: n }) => n,
        None => 0,
    };
    let documents = resp.hits.hits.into_iter().map(|hit| hit.source).collect();

    Ok(SearchHits { total, documents })
}

/// Human-readable cause from an Elasticsearch error body.
pub(crate) fn error_reason(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let reason = parsed.as_ref().and_then(|v| {
        let err = v.get("error")?;
        err.get("reason").and_then(Value::as_str).or_else(|| err.as_str())
    });
    match reason {
        Some(r) => r.to_owned(),
        None if body.trim().is_empty() => "empty response".to_owned(),
        None => body.trim().to_owned(),
    }
}
