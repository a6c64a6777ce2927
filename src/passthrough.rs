//! Passthrough Adapter: one upstream resource, re-wrapped in the envelope.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::envelope::Envelope;
use crate::error::GatewayError;
use crate::handler::{BoxFuture, Handler};
use crate::request::Request;
use crate::response::IntoResponse;
use crate::upstream::Upstream;

/// Whether the envelope carries a `total` key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TotalField {
    /// `total` is the element count when the payload is an array, and absent
    /// otherwise.
    Count,
    /// `total` is never sent, whatever the payload. `/stats` answers this way
    /// and clients depend on it.
    Omit,
}

/// Serves one fixed upstream resource.
pub struct PassthroughAdapter {
    upstream: Arc<dyn Upstream>,
    resource: String,
    total: TotalField,
}

impl PassthroughAdapter {
    pub fn new(upstream: Arc<dyn Upstream>, resource: impl Into<String>, total: TotalField) -> Self {
        Self { upstream, resource: resource.into(), total }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub async fn fetch(&self) -> Result<Envelope, GatewayError> {
        let payload = self.upstream.fetch(&self.resource).await.inspect_err(|e| {
            warn!(resource = %self.resource, "upstream fetch failed: {e}");
        })?;

        let total = match (self.total, &payload) {
            (TotalField::Count, Value::Array(items)) => Some(items.len() as u64),
            _ => None,
        };

        let envelope = Envelope::success(payload);
        Ok(match total {
            Some(n) => envelope.with_total(n),
            None => envelope,
        })
    }
}

impl Handler for PassthroughAdapter {
    fn call(&self, _req: Request) -> BoxFuture<'_> {
        Box::pin(async move { self.fetch().await.into_response() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpstreamError;
    use async_trait::async_trait;
    use serde_json::json;

    struct Fixed(Result<Value, &'static str>);

    #[async_trait]
    impl Upstream for Fixed {
        async fn fetch(&self, _resource: &str) -> Result<Value, UpstreamError> {
            self.0.clone().map_err(|e| UpstreamError::Fetch(e.to_owned()))
        }
    }

    fn adapter(payload: Result<Value, &'static str>, total: TotalField) -> PassthroughAdapter {
        PassthroughAdapter::new(Arc::new(Fixed(payload)), "summary", total)
    }

    #[tokio::test]
    async fn array_payload_gets_a_total() {
        let env = adapter(Ok(json!([{"a": 1}, {"a": 2}])), TotalField::Count).fetch().await.unwrap();
        assert_eq!(env.total(), Some(2));
        assert_eq!(env.data(), &json!([{"a": 1}, {"a": 2}]));
    }

    #[tokio::test]
    async fn object_payload_has_no_total() {
        let env = adapter(Ok(json!({"active": 10})), TotalField::Count).fetch().await.unwrap();
        assert_eq!(env.total(), None);
    }

    #[tokio::test]
    async fn omit_never_sends_total() {
        let env = adapter(Ok(json!([1, 2, 3])), TotalField::Omit).fetch().await.unwrap();
        assert_eq!(env.total(), None);
        assert_eq!(
            serde_json::to_string(&env).unwrap(),
            r#"{"status":"success","data":[1,2,3]}"#
        );
    }

    #[tokio::test]
    async fn repeated_fetches_are_identical() {
        let a = adapter(Ok(json!([{"x": 1}])), TotalField::Count);
        let first = serde_json::to_vec(&a.fetch().await.unwrap()).unwrap();
        let second = serde_json::to_vec(&a.fetch().await.unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn failure_propagates() {
        let err = adapter(Err("connection refused"), TotalField::Count).fetch().await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch data from API: connection refused");
    }
}
