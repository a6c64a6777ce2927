//! Middleware layer.
//!
//! Cross-cutting concerns wrapped around every route by the server:
//!
//! - [`cors`] — open CORS policy. Any origin, method and header is allowed,
//!   preflight `OPTIONS` requests are answered before reaching the router.
//! - [`trace`] — one `tracing` span per request with method, path, status
//!   and latency.

use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Permits cross-origin requests from any origin on every route.
pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}

/// Per-request span, logged at `INFO` when the response is sent.
pub fn trace() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}
