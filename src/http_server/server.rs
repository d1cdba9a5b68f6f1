//! # HTTP Server
//!
//! Builds the router from explicitly constructed route states and serves it.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::query::{QueryExecutor, QueryPipeline};

use super::chinook_routes::{chinook_routes, ChinookState};
use super::config::HttpServerConfig;
use super::lookup_routes::{lookup_routes, LookupState};
use super::misc_routes::misc_routes;
use super::observability_routes::health_routes;
use super::stats_routes::{stats_routes, StatsState};
use super::upstream::UpstreamClient;

/// HTTP server for the Chinook endpoints
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server whose routes use `executor` and `upstream`
    pub fn new(
        config: HttpServerConfig,
        executor: Arc<dyn QueryExecutor>,
        upstream: UpstreamClient,
    ) -> Self {
        let chinook_state = Arc::new(ChinookState::new(QueryPipeline::new(executor)));
        let lookup_state = Arc::new(LookupState::new(upstream));
        let stats_state = Arc::new(StatsState::new(config.stats.clone()));
        let router = Self::build_router(&config, chinook_state, lookup_state, stats_state);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    pub fn build_router(
        config: &HttpServerConfig,
        chinook_state: Arc<ChinookState>,
        lookup_state: Arc<LookupState>,
        stats_state: Arc<StatsState>,
    ) -> Router {
        // Configure CORS from config
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(health_routes())
            .merge(misc_routes())
            .merge(chinook_routes(chinook_state))
            .merge(lookup_routes(lookup_state))
            .merge(stats_routes(stats_state))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server (async)
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid socket address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "chinook-api listening");

        axum::serve(listener, self.router).await?;

        Ok(())
    }
}
