//! The gateway's route table.

use std::sync::Arc;

use http::Method;
use reqwest::Client;

use crate::config::GatewayConfig;
use crate::error::Error;
use crate::health::{self, Readiness};
use crate::passthrough::{PassthroughAdapter, TotalField};
use crate::range::RangeQueryAdapter;
use crate::router::Router;
use crate::store::{DocumentStore, ElasticsearchStore};
use crate::upstream::{HttpUpstream, Upstream};

/// `(route, upstream resource, total)` for every passthrough route.
pub const PASSTHROUGH_ROUTES: [(&str, &str, TotalField); 7] = [
    ("/daily_deaths",     "daily-deaths-slovenia",     TotalField::Count),
    ("/daily_deaths_age", "age-daily-deaths-slovenia", TotalField::Count),
    ("/lab_tests",        "lab-tests",                 TotalField::Count),
    ("/summary",          "summary",                   TotalField::Count),
    ("/stats",            "stats",                     TotalField::Omit),
    ("/stats_weekly",     "stats-weekly",              TotalField::Count),
    ("/patients",         "patients",                  TotalField::Count),
];

/// Store collections behind the two range routes.
#[derive(Clone, Debug)]
pub struct Collections {
    /// Served at `/covid_regije`.
    pub regions: String,
    /// Served at `/covid_starost`.
    pub age_groups: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self { regions: "covid_regije".to_owned(), age_groups: "covid_starost".to_owned() }
    }
}

/// Builds the full router over explicitly supplied collaborators.
pub fn router(
    store: Arc<dyn DocumentStore>,
    upstream: Arc<dyn Upstream>,
    collections: &Collections,
) -> Router {
    let mut router = Router::new()
        .on(Method::GET, "/healthz", health::liveness)
        .route(Method::GET, "/readyz", Readiness::new(Arc::clone(&store)))
        .route(
            Method::GET,
            "/covid_regije",
            RangeQueryAdapter::new(Arc::clone(&store), collections.regions.clone()),
        )
        .route(
            Method::GET,
            "/covid_starost",
            RangeQueryAdapter::new(Arc::clone(&store), collections.age_groups.clone()),
        );

    for (path, resource, total) in PASSTHROUGH_ROUTES {
        router = router.route(
            Method::GET,
            path,
            PassthroughAdapter::new(Arc::clone(&upstream), resource, total),
        );
    }
    router
}

/// Builds the production collaborators described by `config` and the router
/// over them.
pub fn from_config(config: &GatewayConfig) -> Result<Router, Error> {
    let client = Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let store: Arc<dyn DocumentStore> =
        Arc::new(ElasticsearchStore::new(client.clone(), &config.store_url)?);
    let upstream: Arc<dyn Upstream> = Arc::new(HttpUpstream::new(client, &config.upstream_url)?);

    let collections = Collections {
        regions: config.regions_index.clone(),
        age_groups: config.age_groups_index.clone(),
    };
    Ok(router(store, upstream, &collections))
}
