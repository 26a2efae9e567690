//! Web application: the HTTP surface over the contact store.

mod routes;
pub mod views;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::ContactStore;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Backing store.
    pub store: Arc<dyn ContactStore>,
    /// Heading shown in the sidebar and the page title.
    pub title: Arc<str>,
}

impl AppState {
    /// Build handler state from a store and the configured title.
    #[must_use]
    pub fn new(store: Arc<dyn ContactStore>, title: &str) -> Self {
        Self {
            store,
            title: Arc::from(title),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new().merge(routes::routes()).with_state(state)
}

/// Bind the configured address and serve until interrupted.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(config: &Config, store: Arc<dyn ContactStore>) -> Result<()> {
    let addr = config.server.listen.as_str();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| Error::Bind {
            addr: addr.to_string(),
            source,
        })?;

    info!("Listening on http://{}", listener.local_addr()?);

    let app = router(AppState::new(store, &config.server.title));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

/// Failure of a request handler.
#[derive(Debug)]
pub enum WebError {
    /// The requested contact does not exist.
    NotFound,
    /// The store failed.
    Internal(Error),
}

impl From<Error> for WebError {
    fn from(err: Error) -> Self {
        if err.is_not_found() {
            Self::NotFound
        } else {
            Self::Internal(err)
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            Self::Internal(err) => {
                error!("Request failed: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
