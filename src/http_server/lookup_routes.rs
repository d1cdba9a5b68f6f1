//! Lookup Routes
//!
//! Endpoints that relay data from external services.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};

use super::errors::{ApiError, ApiResult};
use super::params::CurrencyParams;
use super::upstream::UpstreamClient;

/// State shared by the lookup routes
pub struct LookupState {
    pub client: UpstreamClient,
}

impl LookupState {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }
}

/// Create the lookup routes
pub fn lookup_routes(state: Arc<LookupState>) -> Router {
    Router::new()
        .route("/bitcoin-rate", get(bitcoin_rate_handler))
        .route("/get-astronauts", get(astronauts_handler))
        .with_state(state)
}

async fn bitcoin_rate_handler(
    State(state): State<Arc<LookupState>>,
    query: Result<Query<CurrencyParams>, QueryRejection>,
) -> ApiResult<String> {
    let Query(params) = query.map_err(|rejection| ApiError::InvalidQuery(rejection.body_text()))?;
    let currency = params.currency()?;
    Ok(state.client.bitcoin_rate(currency).await?)
}

async fn astronauts_handler(
    State(state): State<Arc<LookupState>>,
) -> ApiResult<Json<BTreeMap<String, u64>>> {
    Ok(Json(state.client.astronauts_by_craft().await?))
}
