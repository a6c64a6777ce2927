//! Kubernetes health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Is the document store reachable? Failure → pulled from load-balancer. |
//!
//! Readiness does not check the upstream API. Upstream outages surface as
//! error envelopes on the passthrough routes.

use std::sync::Arc;

use http::StatusCode;
use tracing::warn;

use crate::handler::{BoxFuture, Handler};
use crate::request::Request;
use crate::response::Response;
use crate::store::DocumentStore;

/// Liveness probe. Always `200 ok`.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Readiness probe. `200 ready` when the store answers a ping, `503`
/// otherwise.
pub struct Readiness {
    store: Arc<dyn DocumentStore>,
}

impl Readiness {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn check(&self) -> Response {
        match self.store.ping().await {
            Ok(()) => Response::text("ready"),
            Err(e) => {
                warn!("readiness check failed: {e}");
                Response::builder()
                    .status(StatusCode::SERVICE_UNAVAILABLE)
                    .text("document store unavailable")
            }
        }
    }
}

impl Handler for Readiness {
    fn call(&self, _req: Request) -> BoxFuture<'_> {
        Box::pin(self.check())
    }
}
