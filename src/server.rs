//! HTTP server and graceful shutdown.
//!
//! # Graceful shutdown and Kubernetes
//!
//! When Kubernetes terminates a pod it sends **SIGTERM** and waits
//! `terminationGracePeriodSeconds` (default 30 s) before sending SIGKILL.
//!
//! The server reacts by:
//! 1. Immediately dropping the listener — no new connections are accepted.
//! 2. Asking every open connection to finish its in-flight request and close.
//! 3. Returning from [`Server::serve`] once they have, or after
//!    [`DRAIN_TIMEOUT`], whichever comes first.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{ALLOW, CONTENT_LENGTH};
use http::{HeaderValue, Method, StatusCode};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use hyper_util::service::TowerToHyperService;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower::ServiceBuilder;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::middleware;
use crate::request::Request;
use crate::response::Response;
use crate::router::{Route, Router};

/// Upper bound on how long shutdown waits for open connections.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// The HTTP server.
pub struct Server {
    listener: TcpListener,
    addr: SocketAddr,
}

impl Server {
    /// Binds the listening socket. Port `0` picks a free port, see
    /// [`local_addr`](Server::local_addr).
    ///
    /// ```rust,no_run
    /// # async fn run() -> Result<(), sledilnik_gateway::Error> {
    /// use sledilnik_gateway::Server;
    /// let server = Server::bind("127.0.0.1:5000").await?;
    /// # Ok(()) }
    /// ```
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        Ok(Self { listener, addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serves `router` until SIGTERM or Ctrl-C, then drains connections.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Serves `router` until `signal` resolves, then drains connections.
    pub async fn serve_with_shutdown<F>(self, router: Router, signal: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        let Self { listener, addr } = self;
        let router = Arc::new(router);

        // Middleware runs outermost-first: trace sees the final status,
        // CORS answers preflights before the router is consulted.
        let service = ServiceBuilder::new()
            .layer(middleware::trace())
            .layer(middleware::cors())
            .service_fn(move |req: hyper::Request<Incoming>| {
                let router = Arc::clone(&router);
                async move { Ok::<_, Infallible>(dispatch(&router, req).await) }
            });

        let builder = ConnBuilder::new(TokioExecutor::new());
        let graceful = GracefulShutdown::new();

        info!(addr = %addr, "gateway listening");

        tokio::pin!(signal);

        loop {
            tokio::select! {
                biased;

                () = &mut signal => {
                    info!("shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, peer) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let svc = TowerToHyperService::new(service.clone());
                    let conn = builder.serve_connection_with_upgrades(TokioIo::new(stream), svc);
                    let conn = graceful.watch(conn.into_owned());

                    tokio::spawn(async move {
                        if let Err(e) = conn.await {
                            error!(peer = %peer, "connection error: {e}");
                        }
                    });
                }
            }
        }

        drop(listener);

        tokio::select! {
            () = graceful.shutdown() => info!("gateway stopped"),
            () = tokio::time::sleep(DRAIN_TIMEOUT) => {
                warn!(timeout = ?DRAIN_TIMEOUT, "drain timed out, closing remaining connections");
            }
        }
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request and produces one response. Every failure is already a
/// response by the time it gets here, so the service never errors.
async fn dispatch(router: &Router, req: hyper::Request<Incoming>) -> http::Response<Full<Bytes>> {
    let (parts, _body) = req.into_parts();
    let head = parts.method == Method::HEAD;

    let route = router.lookup(&parts.method, parts.uri.path());

    let response = match route {
        Route::Found(handler, params) => handler.call(Request::new(parts, params)).await,
        Route::MethodNotAllowed(allowed) => method_not_allowed(&allowed),
        Route::NotFound => Response::status(StatusCode::NOT_FOUND),
    };

    let response = if head { without_body(response) } else { response };
    response.into_inner()
}

/// The `HEAD` form of a `GET` response: same status and headers, the
/// length of the body it replaces, no body.
fn without_body(mut response: Response) -> Response {
    let len = response.body.len();
    response.body = Bytes::new();
    response.headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
    response
}

fn method_not_allowed(allowed: &[http::Method]) -> Response {
    let allow = allowed.iter().map(http::Method::as_str).collect::<Vec<_>>().join(", ");
    let mut res = Response::status(StatusCode::METHOD_NOT_ALLOWED);
    if let Ok(value) = HeaderValue::from_str(&allow) {
        res.headers.insert(ALLOW, value);
    }
    res
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM (Kubernetes) or SIGINT (Ctrl-C). On
/// non-Unix platforms only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
