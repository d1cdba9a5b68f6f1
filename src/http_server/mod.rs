//! # HTTP Server Module
//!
//! Axum server exposing the Chinook query endpoints alongside a handful of
//! standalone utility routes.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/get-customers`, `/stats-by-city`, `/get-all-info-about-track*`, `/sales` - Store queries
//! - `/`, `/hello`, `/now`, `/password-generator`, `/get-password_generator` - Utilities
//! - `/bitcoin-rate`, `/get-astronauts` - External lookups
//! - `/average-statistics`, `/generate-students` - Student CSV files

pub mod chinook_routes;
pub mod config;
pub mod errors;
pub mod lookup_routes;
pub mod misc_routes;
pub mod observability_routes;
pub mod params;
pub mod server;
pub mod stats_routes;
pub mod upstream;

pub use config::{HttpServerConfig, StatsConfig, UpstreamConfig};
pub use errors::{ApiError, ApiResult};
pub use server::HttpServer;
pub use upstream::UpstreamClient;
