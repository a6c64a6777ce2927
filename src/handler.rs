//! Handler trait and type erasure.
//!
//! The router stores handlers of different concrete types in one table, so
//! they are held as trait objects:
//!
//! ```text
//! RangeQueryAdapter / PassthroughAdapter     ← implement Handler directly
//! async fn liveness(req: Request) -> Response ← wrapped in FnHandler by Router::on
//!        ↓
//! Arc<dyn Handler>                            ← BoxedHandler, one per route
//!        ↓
//! handler.call(req).await                     ← one vtable dispatch per request
//! ```
//!
//! Adapters implement [`Handler`] themselves because they carry injected
//! state (a store or upstream client) and a route-specific parameter.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future resolving to a [`Response`].
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = Response> + Send + 'a>>;

/// A route handler.
///
/// Implement this for types that own their dependencies. Plain
/// `async fn(Request) -> impl IntoResponse` functions are registered with
/// [`Router::on`](crate::Router::on) instead and never implement it by hand.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture<'_>;
}

/// A handler shared across concurrent requests.
pub(crate) type BoxedHandler = Arc<dyn Handler>;

/// Adapts an `async fn(Request) -> R` into a [`Handler`].
pub(crate) struct FnHandler<F>(pub(crate) F);

impl<F, Fut, R> Handler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<'_> {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
