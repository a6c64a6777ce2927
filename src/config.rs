//! Gateway configuration, read from `GATEWAY_*` environment variables.

use std::collections::HashMap;
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;
use crate::upstream::DEFAULT_UPSTREAM_URL;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GatewayConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Document store (Elasticsearch) base URL
    #[serde(default = "default_store_url")]
    pub store_url: String,

    /// Index backing `/covid_regije`
    #[serde(default = "default_regions_index")]
    pub regions_index: String,

    /// Index backing `/covid_starost`
    #[serde(default = "default_age_groups_index")]
    pub age_groups_index: String,

    /// Upstream statistics API base URL
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    /// Timeout for every outbound request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error), overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::with_prefix("GATEWAY"))
    }

    /// Same as [`from_env`](Self::from_env) but reads `vars` instead of the
    /// process environment.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let source: config::Map<String, String> = vars.into_iter().collect();
        Self::from_environment(Environment::with_prefix("GATEWAY").source(Some(source)))
    }

    fn from_environment(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            store_url: default_store_url(),
            regions_index: default_regions_index(),
            age_groups_index: default_age_groups_index(),
            upstream_url: default_upstream_url(),
            request_timeout_secs: default_request_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

/// Validates an outbound base URL and strips its trailing `/`.
///
/// Only absolute `http`/`https` URLs are accepted. `localhost:9200` parses
/// as scheme `localhost` with an opaque path, so it is rejected here rather
/// than failing on the first request.
pub(crate) fn http_base_url(raw: &str) -> Result<String, Error> {
    let invalid = |reason: String| Error::Url { url: raw.to_owned(), reason };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("not a base url".to_owned()));
    }
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    Ok(raw.trim_end_matches('/').to_owned())
}

fn default_listen_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_store_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_regions_index() -> String {
    "covid_regije".to_string()
}

fn default_age_groups_index() -> String {
    "covid_starost".to_string()
}

fn default_upstream_url() -> String {
    DEFAULT_UPSTREAM_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}
