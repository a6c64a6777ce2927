//! # sledilnik-gateway
//!
//! A thin HTTP gateway in front of two data sources:
//!
//! - an Elasticsearch cluster holding time-stamped COVID-19 documents, queried
//!   for the last `N` days ([`RangeQueryAdapter`]), and
//! - the Sledilnik statistics API, whose resources are forwarded unchanged
//!   ([`PassthroughAdapter`]).
//!
//! Every data route answers with the same JSON [`Envelope`]:
//!
//! ```json
//! {"status": "success", "total": 5, "timeframe": {"start": "…", "end": "…"}, "data": [ … ]}
//! {"status": "error", "message": "…", "data": []}
//! ```
//!
//! No caching, no retries, no auth. One inbound request, one downstream round
//! trip, one response.
//!
//! ## Routes
//!
//! | Route | Source |
//! |---|---|
//! | `/covid_regije?days=N` | index `covid_regije` |
//! | `/covid_starost?days=N` | index `covid_starost` |
//! | `/daily_deaths`, `/daily_deaths_age`, `/lab_tests`, `/summary`, `/stats`, `/stats_weekly`, `/patients` | upstream API |
//! | `/healthz`, `/readyz` | probes |
//!
//! ## Wiring it up
//!
//! Collaborators are constructed explicitly and handed to [`routes::router`],
//! so tests can swap in fakes:
//!
//! ```rust,no_run
//! use sledilnik_gateway::{GatewayConfig, Server, routes};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sledilnik_gateway::Error> {
//!     let config = GatewayConfig::from_env()?;
//!     let app = routes::from_config(&config)?;
//!     Server::bind(config.listen_addr.as_str()).await?.serve(app).await
//! }
//! ```

mod envelope;
mod error;
mod handler;
mod passthrough;
mod range;
mod request;
mod response;
mod router;
mod server;

pub mod config;
pub mod health;
pub mod middleware;
pub mod routes;
pub mod store;
pub mod telemetry;
pub mod upstream;
pub mod window;

pub use config::GatewayConfig;
pub use envelope::{Envelope, Outcome};
pub use error::{Error, GatewayError, StoreError, UpstreamError};
pub use handler::{BoxFuture, Handler};
pub use passthrough::{PassthroughAdapter, TotalField};
pub use range::{MAX_RESULTS, RangeQueryAdapter};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::{DRAIN_TIMEOUT, Server};
pub use window::TimeWindow;
