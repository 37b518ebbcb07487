//! HTTP server for passrate.
//!
//! Serves the JSON record API plus the search and upload pages.

use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use passrate_core::control::ResultsControlPlane;
use surrealdb::Connection;
use tracing::info;

mod api;
mod error;
mod pages;

pub use error::ApiError;

pub const DEFAULT_PORT: u16 = 4030;
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    pub addr: SocketAddr,
    pub max_body_bytes: usize,
}

impl WebServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    #[must_use]
    pub const fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)))
    }
}

/// HTTP server wrapper.
pub struct WebServer<C: Connection> {
    config: WebServerConfig,
    state: AppState<C>,
}

impl<C: Connection> WebServer<C> {
    #[must_use]
    pub const fn new(control: ResultsControlPlane<C>, config: WebServerConfig) -> Self {
        Self {
            config,
            state: AppState { control },
        }
    }
}

impl<C> WebServer<C>
where
    C: Connection + Send + Sync + 'static,
{
    /// Runs the HTTP server until `shutdown` resolves and in-flight requests
    /// finish.
    ///
    /// # Errors
    /// Returns any listener or server error.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.addr;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let app = router(self.state, self.config.max_body_bytes);

        info!("passrate listening on {addr}");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("passrate stopped accepting requests");
        Ok(())
    }
}

pub(crate) struct AppState<C: Connection> {
    pub(crate) control: ResultsControlPlane<C>,
}

impl<C: Connection> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            control: self.control.clone(),
        }
    }
}

/// Builds the full router around a control plane.
pub fn build_router<C>(control: ResultsControlPlane<C>, max_body_bytes: usize) -> Router
where
    C: Connection + Send + Sync + 'static,
{
    router(AppState { control }, max_body_bytes)
}

fn router<C>(state: AppState<C>, max_body_bytes: usize) -> Router
where
    C: Connection + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/teachers",
            get(api::list_teachers::<C>)
                .post(api::append_teachers::<C>)
                .fallback(api::method_not_allowed),
        )
        .route("/", get(pages::search::search_page::<C>))
        .route("/export.pdf", get(pages::search::export_pdf::<C>))
        .route(
            "/upload",
            get(pages::upload::upload_form::<C>).post(pages::upload::convert_upload::<C>),
        )
        .route("/upload/download", post(pages::upload::download_json::<C>))
        .route("/upload/append", post(pages::upload::append_upload::<C>))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
