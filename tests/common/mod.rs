#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use sledilnik_gateway::routes::{self, Collections};
use sledilnik_gateway::store::{DocumentStore, ElasticsearchStore, RangeQuery, SearchHits, TIMESTAMP_FIELD};
use sledilnik_gateway::upstream::{HttpUpstream, Upstream};
use sledilnik_gateway::{Router, Server, StoreError};
use tokio::sync::oneshot;

/// Store fake that applies the range filter, sort and size limit itself.
#[derive(Default)]
pub struct InMemoryStore {
    collections: Vec<(String, Vec<Value>)>,
    pub searches: AtomicUsize,
}

impl InMemoryStore {
    pub fn with(mut self, collection: &str, docs: Vec<Value>) -> Self {
        self.collections.push((collection.to_owned(), docs));
        self
    }
}

fn timestamp(doc: &Value) -> Option<DateTime<Utc>> {
    let raw = doc.get(TIMESTAMP_FIELD)?.as_str()?;
    DateTime::parse_from_rfc3339(raw).ok().map(|t| t.with_timezone(&Utc))
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn search(&self, query: &RangeQuery) -> Result<SearchHits, StoreError> {
        self.searches.fetch_add(1, Ordering::SeqCst);

        let docs = self.collections.iter()
            .find(|(name, _)| *name == query.collection)
            .map(|(_, docs)| docs)
            .ok_or_else(|| StoreError::Status {
                status: 404,
                reason: format!("no such index [{}]", query.collection),
            })?;

        let mut matched: Vec<(DateTime<Utc>, Value)> = docs.iter()
            .filter_map(|doc| timestamp(doc).map(|t| (t, doc.clone())))
            .filter(|(t, _)| *t >= query.window.start() && *t <= query.window.end())
            .collect();
        matched.sort_by(|a, b| b.0.cmp(&a.0));

        let total = matched.len() as u64;
        let documents = matched.into_iter().take(query.size).map(|(_, doc)| doc).collect();
        Ok(SearchHits { total, documents })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Store fake whose every call fails like a refused connection.
///
/// Only for tests about how failures are routed. Tests about the message
/// itself go through [`ElasticsearchStore`] at [`closed_port_url`].
pub struct UnreachableStore;

const REFUSED: &str = "error sending request for url (http://127.0.0.1:9/): \
                       client error (Connect): tcp connect error: Connection refused (os error 111)";

#[async_trait]
impl DocumentStore for UnreachableStore {
    async fn search(&self, _query: &RangeQuery) -> Result<SearchHits, StoreError> {
        Err(StoreError::Transport(REFUSED.into()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Transport(REFUSED.into()))
    }
}

/// Base URL of a local port nothing listens on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Client that gives up on any request after `timeout`.
pub fn client_with_timeout(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder().timeout(timeout).build().unwrap()
}

/// Elasticsearch store at `base` over `client`.
pub fn elasticsearch(client: reqwest::Client, base: &str) -> Arc<dyn DocumentStore> {
    Arc::new(ElasticsearchStore::new(client, base).unwrap())
}

/// A document timestamped `age` before now.
pub fn doc_aged(age: chrono::TimeDelta, id: u32) -> Value {
    let ts = (Utc::now() - age).to_rfc3339();
    json!({ "@timestamp": ts, "id": id })
}

/// Upstream pointed at `base` over a plain client.
pub fn http_upstream(base: &str) -> Arc<dyn Upstream> {
    http_upstream_over(reqwest::Client::new(), base)
}

pub fn http_upstream_over(client: reqwest::Client, base: &str) -> Arc<dyn Upstream> {
    Arc::new(HttpUpstream::new(client, base).unwrap())
}

/// Router over the given collaborators with the default collections.
pub fn app(store: Arc<dyn DocumentStore>, upstream: Arc<dyn Upstream>) -> Router {
    routes::router(store, upstream, &Collections::default())
}

pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Serves `router` on an ephemeral port until the returned handle drops.
pub async fn spawn(router: Router) -> TestServer {
    let server = Server::bind("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr();
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(server.serve_with_shutdown(router, async {
        let _ = rx.await;
    }));

    TestServer { addr, shutdown: Some(tx) }
}
