//! HTTP server for the report service.
//!
//! # Responsibilities
//! - Run the accept loop on the listener thread
//! - Drop non-local peers and disallowed Host headers without a response
//! - Parse the route, dispatch it to the owner thread, write the payload
//! - Serve one connection at a time, in arrival order
//!
//! # Request states
//! ```text
//! Accepted → SecurityChecked{pass | drop}
//!          → RouteParsed{match | miss → "{}"}
//!          → Dispatched → {Completed | Cancelled | Faulted → "{}"}
//!          → ResponseWritten → Closed
//! ```

use axum::body::Body;
use axum::http::{Request, Response};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::dispatch::{Dispatched, Dispatcher};
use crate::http::response::{empty_response, json_response};
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::net::Listener;
use crate::observability::metrics::{self, RequestOutcome};
use crate::routing::parse_route;
use crate::security::{HostAllowList, Rejection, SecurityFilter};

/// Reasons a request ends without a response. Returning one of these from
/// the service makes hyper close the connection without writing anything.
#[derive(Debug, Error)]
pub enum Dropped {
    #[error("request rejected: {0}")]
    Rejected(#[from] Rejection),
    #[error("request body unreadable: {0}")]
    Body(#[source] axum::Error),
    #[error("request body not received within {0:?}")]
    ReadTimeout(Duration),
    #[error("shutdown while waiting for the owner thread")]
    Cancelled,
}

/// State shared by every request on the listener thread.
#[derive(Debug)]
struct RequestContext {
    filter: SecurityFilter,
    dispatcher: Dispatcher,
    max_body_bytes: usize,
    read_timeout: Duration,
}

/// HTTP server for the report service.
#[derive(Debug)]
pub struct ReportHttpServer {
    ctx: Arc<RequestContext>,
}

impl ReportHttpServer {
    pub fn new(config: &ServiceConfig, dispatcher: Dispatcher) -> Self {
        let filter = SecurityFilter::new(HostAllowList::new(config.allowed_hosts()));
        Self {
            ctx: Arc::new(RequestContext {
                filter,
                dispatcher,
                max_body_bytes: config.limits.max_body_bytes,
                read_timeout: config.limits.read_timeout(),
            }),
        }
    }

    /// Accept and serve connections until `shutdown` fires.
    pub async fn serve(&self, listener: Listener, shutdown: ShutdownSignal) {
        tracing::info!(
            addresses = ?listener.local_addrs(),
            allowed_hosts = ?self.ctx.filter.allowed_hosts(),
            "Report server accepting connections"
        );

        loop {
            let accepted = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                accepted = listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, peer)) => self.handle_connection(stream, peer, &shutdown).await,
                Err(e) => tracing::warn!(error = %e, "Listener fault, continuing"),
            }
        }

        // Dropping the listener here aborts any further accepts.
        drop(listener);
        tracing::info!("Report server stopped accepting");
    }

    async fn handle_connection(
        &self,
        stream: TcpStream,
        peer: SocketAddr,
        shutdown: &ShutdownSignal,
    ) {
        if let Err(reason) = self.ctx.filter.check_peer(peer) {
            tracing::trace!(peer_addr = %peer, %reason, "Connection dropped");
            metrics::record_rejection(reason);
            return;
        }

        let ctx = Arc::clone(&self.ctx);
        let service = service_fn(move |request| handle_request(Arc::clone(&ctx), request));
        // Only the header read is timed here; the owner wait is bounded by shutdown alone.
        let connection = http1::Builder::new()
            .timer(TokioTimer::new())
            .header_read_timeout(self.ctx.read_timeout)
            .keep_alive(false)
            .serve_connection(TokioIo::new(stream), service);

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                tracing::debug!(peer_addr = %peer, "Connection abandoned on shutdown");
            }
            served = connection => {
                if let Err(e) = served {
                    tracing::trace!(
                        peer_addr = %peer,
                        error = %e,
                        "Connection closed without response"
                    );
                }
            }
        }
    }
}

async fn handle_request(
    ctx: Arc<RequestContext>,
    request: Request<Incoming>,
) -> Result<Response<Body>, Dropped> {
    if let Err(reason) = ctx.filter.check_host(request.headers()) {
        tracing::trace!(%reason, "Request dropped");
        metrics::record_rejection(reason);
        return Err(reason.into());
    }

    let span = tracing::info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        let route = match parse_route(request.uri().path(), request.uri().query()) {
            Ok(route) => route,
            Err(miss) => {
                tracing::debug!(%miss, "No route matched");
                metrics::record_request(RequestOutcome::RouteMiss);
                return Ok(empty_response());
            }
        };

        let input = read_input(request, ctx.max_body_bytes, ctx.read_timeout).await?;

        match ctx.dispatcher.dispatch(route, input).await {
            Dispatched::Completed(payload) => {
                metrics::record_request(RequestOutcome::Completed);
                Ok(payload.map(json_response).unwrap_or_else(empty_response))
            }
            Dispatched::Cancelled => {
                tracing::debug!("Request cancelled by shutdown");
                metrics::record_request(RequestOutcome::Cancelled);
                Err(Dropped::Cancelled)
            }
            Dispatched::Faulted => {
                tracing::error!("Report handler faulted");
                metrics::record_request(RequestOutcome::Faulted);
                Ok(empty_response())
            }
        }
    }
    .instrument(span)
    .await
}

/// Buffer the request body; empty bodies are no input.
async fn read_input(
    request: Request<Incoming>,
    limit: usize,
    deadline: Duration,
) -> Result<Option<String>, Dropped> {
    let body = axum::body::to_bytes(Body::new(request.into_body()), limit);
    let bytes = tokio::time::timeout(deadline, body)
        .await
        .map_err(|_| Dropped::ReadTimeout(deadline))?
        .map_err(Dropped::Body)?;
    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}
