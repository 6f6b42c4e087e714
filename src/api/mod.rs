//! HTTP API server for the tutor gateway

pub mod ask;
mod error;
pub mod health;
pub mod history;
pub mod rate_limit;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ErrorBody, ErrorResponse};

use crate::Result;
use crate::handler::RequestHandler;
use crate::history::HistoryStore;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub handler: RequestHandler,
    /// Entries returned by a history read without an explicit `limit`
    pub default_read_limit: usize,
    pub rate_limiter: Option<rate_limit::SharedLimiter>,
}

impl ApiState {
    #[must_use]
    pub fn store(&self) -> &HistoryStore {
        self.handler.store()
    }
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    handler: RequestHandler,
    port: u16,
    default_read_limit: usize,
    rate_limit_per_minute: Option<u32>,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(handler: RequestHandler) -> Self {
        Self {
            handler,
            port: 8000,
            default_read_limit: 10,
            rate_limit_per_minute: None,
        }
    }

    /// Set the port to listen on
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the default `limit` for history reads
    #[must_use]
    pub fn default_read_limit(mut self, limit: usize) -> Self {
        self.default_read_limit = limit;
        self
    }

    /// Enable a global request quota
    #[must_use]
    pub fn rate_limit(mut self, requests_per_minute: Option<u32>) -> Self {
        self.rate_limit_per_minute = requests_per_minute;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let rate_limiter = self.rate_limit_per_minute.map(|rpm| {
            tracing::info!(requests_per_minute = rpm, "rate limiting active");
            rate_limit::create_limiter(rpm)
        });

        let state = Arc::new(ApiState {
            handler: self.handler,
            default_read_limit: self.default_read_limit,
            rate_limiter,
        });

        ApiServer {
            state,
            port: self.port,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    /// Build the router with all routes
    pub fn router(&self) -> Router {
        let router = Router::new()
            .merge(ask::router(self.state.clone()))
            .merge(history::router(self.state.clone()))
            .merge(health::router())
            .merge(health::ready_router(self.state.clone()));

        let router = router.layer(axum::middleware::from_fn_with_state(
            self.state.clone(),
            rate_limit::rate_limit_middleware,
        ));

        // CORS layer for cross-origin requests from frontend
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!(
            port = self.port,
            backend = self.state.handler.backend().name(),
            "API server listening"
        );

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
