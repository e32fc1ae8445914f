//! HTTP transport for the CDDB protocol.
//!
//! Serves the conventional `/~cddb/cddb.cgi` endpoint. Parameters come from
//! the query string on GET and from a urlencoded body on POST; `hello` and
//! anything else besides `cmd` and `proto` is ignored. Every request gets a
//! protocol reply: repeated keys keep their first value and a body is decoded
//! whatever its content type claims.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{RawQuery, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response as HttpResponse},
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::cddb::Gateway;
use crate::cddb::format::CGI_PATH;
use crate::error::{self, Error, ResultExt};
use crate::store::MetadataStore;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// The parameters a CDDB client sends.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CgiParams {
    pub cmd: Option<String>,
    pub proto: Option<String>,
}

impl CgiParams {
    /// Decode `application/x-www-form-urlencoded` input.
    pub fn parse(input: &[u8]) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(input) {
            match key.as_ref() {
                "cmd" if params.cmd.is_none() => params.cmd = Some(value.into_owned()),
                "proto" if params.proto.is_none() => params.proto = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }
}

/// Build the router for `gateway`.
pub fn router<S: MetadataStore + 'static>(gateway: Arc<Gateway<S>>) -> Router {
    Router::new()
        .route(CGI_PATH, get(cgi_get::<S>).post(cgi_post::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(gateway)
}

async fn cgi_get<S: MetadataStore + 'static>(
    State(gateway): State<Arc<Gateway<S>>>,
    RawQuery(query): RawQuery,
) -> HttpResponse {
    let params = CgiParams::parse(query.as_deref().unwrap_or("").as_bytes());
    answer(&gateway, params).await
}

async fn cgi_post<S: MetadataStore + 'static>(
    State(gateway): State<Arc<Gateway<S>>>,
    body: Bytes,
) -> HttpResponse {
    answer(&gateway, CgiParams::parse(&body)).await
}

async fn answer<S: MetadataStore>(gateway: &Gateway<S>, params: CgiParams) -> HttpResponse {
    match gateway
        .respond(params.cmd.as_deref(), params.proto.as_deref())
        .await
    {
        Ok(response) => ([(header::CONTENT_TYPE, TEXT_PLAIN)], response.render()).into_response(),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, TEXT_PLAIN)],
            "Metadata database unavailable\r\n",
        )
            .into_response(),
    }
}

/// Bind `listen` and serve until SIGINT/SIGTERM.
pub async fn serve<S: MetadataStore + 'static>(
    gateway: Gateway<S>,
    listen: &str,
) -> error::Result<()> {
    let addr: SocketAddr = listen
        .parse()
        .map_err(|e| Error::invalid_address(format!("{}: {}", listen, e)))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(format!("binding {}", addr))?;

    tracing::info!(%addr, path = CGI_PATH, "Serving CDDB requests");
    axum::serve(listener, router(Arc::new(gateway)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .with_context("serving HTTP")?;

    tracing::info!("Server stopped");
    Ok(())
}

// ============================================================================
// Graceful shutdown signal
// ============================================================================

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => tracing::info!("Received SIGINT, shutting down..."),
                    _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                tracing::warn!("Failed to register SIGTERM handler: {}", e);
                if ctrl_c.await.is_ok() {
                    tracing::info!("Received SIGINT, shutting down...");
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        match ctrl_c.await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down..."),
            Err(e) => tracing::warn!("Failed to listen for Ctrl+C: {}", e),
        }
    }
}
