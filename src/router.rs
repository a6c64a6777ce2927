//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Register a path, get a
//! handler.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, FnHandler, Handler};
use crate::request::Request;
use crate::response::IntoResponse;

/// Outcome of a [`Router::lookup`].
pub(crate) enum Route {
    Found(BoxedHandler, HashMap<String, String>),
    /// The path exists, but not for this method. Carries the methods that
    /// would have matched.
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

/// The application router. Build once at startup, pass to
/// [`Server::serve`](crate::Server::serve).
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Registers an `async fn(Request) -> impl IntoResponse` for a method +
    /// path pair.
    ///
    /// ```rust
    /// # use http::Method;
    /// # use sledilnik_gateway::{Router, health};
    /// Router::new()
    ///     .on(Method::GET, "/healthz", health::liveness);
    /// ```
    pub fn on<F, Fut, R>(self, method: Method, path: &str, f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + Send + 'static,
    {
        self.route(method, path, FnHandler(f))
    }

    /// Registers a stateful [`Handler`].
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or is already registered for
    /// `method`. Routes are fixed at startup, so this is a programming error.
    pub fn route(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        let handler: BoxedHandler = Arc::new(handler);
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// `HEAD` falls back to the `GET` handler when no `HEAD` route is
    /// registered. The server drops the body.
    pub(crate) fn lookup(&self, method: &Method, path: &str) -> Route {
        if let Some(route) = self.find(method, path) {
            return route;
        }
        if *method == Method::HEAD {
            if let Some(route) = self.find(&Method::GET, path) {
                return route;
            }
        }

        let mut allowed: Vec<Method> = self.routes.iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(m, _)| m.clone())
            .collect();
        if allowed.is_empty() {
            return Route::NotFound;
        }
        if allowed.contains(&Method::GET) && !allowed.contains(&Method::HEAD) {
            allowed.push(Method::HEAD);
        }
        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Route::MethodNotAllowed(allowed)
    }

    fn find(&self, method: &Method, path: &str) -> Option<Route> {
        let matched = self.routes.get(method)?.at(path).ok()?;
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some(Route::Found(Arc::clone(matched.value), params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
