//! HTTP server and graceful shutdown.
//!
//! The server is the host I/O layer around [`Engine::handle`]: it accepts
//! connections, turns each hyper request into a [`Request`], runs the chain,
//! and writes the [`Response`] back. Routing and middleware know nothing
//! about sockets.
//!
//! # Shutdown
//!
//! On **SIGTERM** or **SIGINT** the server stops accepting, lets every
//! in-flight connection task finish, then returns from [`Server::serve`].
//!
//! # Handlers off the async workers
//!
//! Handlers are synchronous, so each chain runs on tokio's blocking pool
//! via `spawn_blocking`. A slow handler holds up only its own request. A
//! handler panic becomes a `500 Internal Server Error` for that request and
//! an `error!` event; the connection and the process carry on.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::engine::Engine;
use crate::error::Error;
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust
    /// use kite::Server;
    ///
    /// assert!(Server::bind("127.0.0.1:9999").is_ok());
    /// assert!(Server::bind("localhost").is_err());
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        let addr = addr.parse().map_err(|source| Error::Address {
            addr: addr.to_owned(),
            source,
        })?;
        Ok(Self { addr })
    }

    /// Starts accepting connections and dispatching them through `engine`.
    ///
    /// Returns only after a full graceful shutdown.
    pub async fn serve(self, engine: Engine) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;

        // Read-only from here on; every connection task shares it.
        let engine = Arc::new(engine);

        info!(addr = %self.addr, "kite listening");

        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM stops accepting at once.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let engine = Arc::clone(&engine);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let engine = Arc::clone(&engine);
                            async move { dispatch(engine, req).await }
                        });

                        // HTTP/1.1 or HTTP/2, whichever the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("kite stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Converts one hyper request, runs it through the engine, converts back.
///
/// Never returns an error to hyper: every failure here is an HTTP response.
async fn dispatch(
    engine: Arc<Engine>,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let Ok(method) = req.method().as_str().parse::<Method>() else {
        return Ok(Response::text(405, "Method Not Allowed").into_http());
    };

    let target = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_owned(), |pq| pq.as_str().to_owned());

    let mut request = Request::new(method, &target);
    for (name, value) in req.headers() {
        if value.to_str().is_err() {
            debug!(header = %name, "request header is not UTF-8, decoding lossily");
        }
        request = request.with_header(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
    }

    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(%method, uri = %target, "failed to read request body: {e}");
            return Ok(Response::text(400, "Bad Request").into_http());
        }
    };
    let request = request.with_body(body.to_vec());

    let response = match tokio::task::spawn_blocking(move || engine.handle(request)).await {
        Ok(response) => response,
        Err(e) if e.is_panic() => {
            error!(%method, uri = %target, "handler panicked");
            Response::text(500, "Internal Server Error")
        }
        Err(e) => {
            error!(%method, uri = %target, "handler task failed: {e}");
            Response::text(500, "Internal Server Error")
        }
    };

    Ok(response.into_http())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// A signal handler that cannot be installed is logged and left pending,
/// so the other one still works.
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
            Ok(mut signal) => {
                signal.recv().await;
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
