//! Upstream statistics API access.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::http_base_url;
use crate::error::{Error, UpstreamError, error_chain};

/// Default base URL of the Sledilnik REST API.
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.sledilnik.org/api";

#[async_trait]
pub trait Upstream: Send + Sync {
    /// `GET <base>/<resource>`, parsed as JSON. One attempt, never retried.
    async fn fetch(&self, resource: &str) -> Result<Value, UpstreamError>;
}

/// [`Upstream`] over plain HTTP. No query parameters, no auth.
pub struct HttpUpstream {
    client: Client,
    base: String,
}

impl HttpUpstream {
    pub fn new(client: Client, base: &str) -> Result<Self, Error> {
        Ok(Self { client, base: http_base_url(base)? })
    }

    fn url_for(&self, resource: &str) -> String {
        format!("{}/{}", self.base, resource.trim_start_matches('/'))
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn fetch(&self, resource: &str) -> Result<Value, UpstreamError> {
        let url = self.url_for(resource);
        debug!(%url, "upstream fetch");

        let body = self.client
            .get(&url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| UpstreamError::Fetch(error_chain(&e)))?
            .bytes()
            .await
            .map_err(|e| UpstreamError::Fetch(error_chain(&e)))?;

        serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}
