//! Range Query Adapter: time-windowed documents from one store collection.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::envelope::Envelope;
use crate::error::GatewayError;
use crate::handler::{BoxFuture, Handler};
use crate::request::Request;
use crate::response::IntoResponse;
use crate::store::{DocumentStore, RangeQuery};
use crate::window::{TimeWindow, parse_days};

/// Most documents a single range query returns.
pub const MAX_RESULTS: usize = 100;

/// Serves `GET /<route>?days=N` from one collection.
///
/// Answers with the documents timestamped in the last `N` days (default 7),
/// newest first, at most [`MAX_RESULTS`], plus the store's total match count
/// and the window that was queried.
pub struct RangeQueryAdapter {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl RangeQueryAdapter {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self { store, collection: collection.into() }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Runs one query over `window`.
    pub async fn query(&self, window: TimeWindow) -> Result<Envelope, GatewayError> {
        let query = RangeQuery { collection: self.collection.clone(), window, size: MAX_RESULTS };

        let hits = self.store.search(&query).await.inspect_err(|e| {
            warn!(collection = %self.collection, "range query failed: {e}");
        })?;

        let mut documents = hits.documents;
        documents.truncate(MAX_RESULTS);

        Ok(Envelope::success(Value::Array(documents))
            .with_total(hits.total)
            .with_timeframe(window))
    }

    async fn handle(&self, req: &Request) -> Result<Envelope, GatewayError> {
        let days = parse_days(req.query("days"))?;
        let window = TimeWindow::last_days(days)?;
        self.query(window).await
    }
}

impl Handler for RangeQueryAdapter {
    fn call(&self, req: Request) -> BoxFuture<'_> {
        Box::pin(async move { self.handle(&req).await.into_response() })
    }
}
