//! Routes and request handling.

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode, Uri, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::config::DocsConfig;
use crate::content_type::{ContentTypeTable, TEXT_HTML};
use crate::discovery::list_artifacts;
use crate::error::ServerError;
use crate::pages;
use crate::respond::{DocResponse, Payload, serve_entry};
use crate::translate::{Resolution, translate_jdk, translate_maven};

/// Value of the `Server` header on every response.
pub const SERVER_NAME: &str = concat!("javadoc-server/", env!("CARGO_PKG_VERSION"));

/// Everything a request may read. Built once before serving and never
/// modified afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<dyn DocsConfig>,
    pub content_types: Arc<ContentTypeTable>,
}

impl AppState {
    pub fn new(config: impl DocsConfig + 'static, content_types: ContentTypeTable) -> Self {
        Self {
            config: Arc::new(config),
            content_types: Arc::new(content_types),
        }
    }
}

/// Build the router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/docs", get(getting_started))
        .route("/jdk", get(jdk_docs))
        .route("/jdk/", get(jdk_docs))
        .route("/jdk/{*path}", get(jdk_docs))
        .route("/m2", get(maven_docs))
        .route("/m2/", get(maven_docs))
        .route("/m2/{*path}", get(maven_docs))
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(internal_error))
        .layer(middleware::from_fn(allow_get_only))
        .layer(middleware::from_fn(server_header))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn run(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    let local = listener.local_addr()?;
    info!(
        "Welcome to javadoc-server. Visit http://{}/docs for initial setup information.",
        local
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Stopped HTTP server");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    warn!("Stopping HTTP server...");
}

async fn index(State(state): State<AppState>) -> Result<DocResponse, ServerError> {
    let jdk_keys = state.config.jdk_keys();
    let repo_root = state.config.maven_repo_root();
    if jdk_keys.is_empty() && repo_root.is_none() {
        return Ok(DocResponse::getting_started());
    }

    let artifacts = match repo_root {
        Some(root) => {
            tokio::task::spawn_blocking(move || list_artifacts(&root))
                .await
                .context("scanning the Maven repository")?
        }
        None => Vec::new(),
    };
    debug!(artifacts = artifacts.len(), "Rendering index");

    let html = pages::render_index(&jdk_keys, &artifacts);
    Ok(DocResponse::fixed(
        StatusCode::OK,
        TEXT_HTML,
        Payload::Content(html.into()),
    ))
}

async fn getting_started() -> DocResponse {
    DocResponse::getting_started()
}

async fn not_found() -> DocResponse {
    DocResponse::not_found()
}

async fn jdk_docs(State(state): State<AppState>, uri: Uri) -> Result<DocResponse, ServerError> {
    let resolution = translate_jdk(uri.path(), state.config.as_ref());
    respond(resolution, &state).await
}

async fn maven_docs(State(state): State<AppState>, uri: Uri) -> Result<DocResponse, ServerError> {
    let resolution = translate_maven(uri.path(), state.config.as_ref());
    respond(resolution, &state).await
}

async fn respond(resolution: Resolution, state: &AppState) -> Result<DocResponse, ServerError> {
    debug!(?resolution, "Resolved request path");
    match resolution {
        Resolution::Archive { archive, entry } => {
            serve_entry(&archive, &entry, &state.content_types).await
        }
        Resolution::BadRequest => Ok(DocResponse::bad_request()),
        Resolution::NotFound => Ok(DocResponse::not_found()),
        Resolution::GettingStarted => Ok(DocResponse::getting_started()),
    }
}

/// A panicking handler still answers with the internal-error page.
fn internal_error(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown cause");
    error!("Request handler panicked: {}", detail);
    DocResponse::html(StatusCode::INTERNAL_SERVER_ERROR, pages::INTERNAL_ERROR).into_response()
}

/// Only GET (and the HEAD requests derived from it) are served.
async fn allow_get_only(request: Request, next: Next) -> Response {
    let method = request.method();
    if *method == Method::GET || *method == Method::HEAD {
        return next.run(request).await;
    }

    debug!(%method, path = request.uri().path(), "Rejecting method");
    let mut response = DocResponse::html(StatusCode::METHOD_NOT_ALLOWED, pages::METHOD_NOT_ALLOWED)
        .into_response();
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static("GET, HEAD"));
    response
}

async fn server_header(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::SERVER, HeaderValue::from_static(SERVER_NAME));
    response
}
