//! Chinook Query Routes
//!
//! Endpoints that run the query pipeline against the music-store database.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::query::{
    DisplayFormat, FilterSet, Literals, ProjectedResult, Projection, QueryPipeline, QueryTemplate,
};
use crate::query::template::{
    CITY_BY_GENRE, CUSTOMERS, SALES_BY_COUNTRY, TRACK_INFO, TRACK_INFO_WITH_DURATION,
};

use super::errors::{ApiError, ApiResult};
use super::params::{CustomerParams, GenreParams, OutputFormat, SalesParams, TrackParams};

// ==================
// Shared State
// ==================

/// State shared by the query routes
pub struct ChinookState {
    pub pipeline: QueryPipeline,
}

impl ChinookState {
    pub fn new(pipeline: QueryPipeline) -> Self {
        Self { pipeline }
    }
}

// ==================
// Chinook Routes
// ==================

/// Create the query routes
pub fn chinook_routes(state: Arc<ChinookState>) -> Router {
    Router::new()
        .route("/get-customers", get(customers_handler))
        .route("/stats-by-city", get(city_by_genre_handler))
        .route("/get-all-info-about-track", get(track_info_handler))
        .route(
            "/get-all-info-about-track-and-albums-in-hours",
            get(track_duration_handler),
        )
        .route("/sales", get(sales_handler))
        .with_state(state)
}

// ==================
// Helper Functions
// ==================

fn extract<T>(query: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::InvalidQuery(rejection.body_text()))
}

fn projection(format: OutputFormat) -> Projection {
    match format {
        OutputFormat::Json => Projection::Structured,
        OutputFormat::Text => Projection::Display(DisplayFormat::HTML),
    }
}

/// Run the pipeline on the blocking pool
async fn run(
    state: &ChinookState,
    template: &'static QueryTemplate,
    filters: FilterSet,
    literals: Literals,
    format: OutputFormat,
) -> ApiResult<ProjectedResult> {
    let pipeline = state.pipeline.clone();
    tokio::task::spawn_blocking(move || {
        pipeline.run(template, &filters, &literals, projection(format))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Query task failed: {}", e)))?
    .map_err(ApiError::from)
}

fn render(result: ProjectedResult, not_found: &str) -> ApiResult<Response> {
    match result {
        ProjectedResult::NoData => Err(ApiError::NotFound(not_found.to_string())),
        ProjectedResult::Display(text) => Ok(Html(text).into_response()),
        ProjectedResult::Records(rows) => Ok(Json(rows).into_response()),
    }
}

// ==================
// Handlers
// ==================

async fn customers_handler(
    State(state): State<Arc<ChinookState>>,
    query: Result<Query<CustomerParams>, QueryRejection>,
) -> ApiResult<Response> {
    let params = extract(query)?;
    params.validate()?;

    let mut filters = CUSTOMERS.filter_set();
    filters.insert("FirstName", params.first_name())?;
    filters.insert("LastName", params.last_name())?;

    let format = params.format.unwrap_or(OutputFormat::Json);
    let result = run(&state, &CUSTOMERS, filters, Literals::new(), format).await?;
    render(result, "No customers found")
}

async fn city_by_genre_handler(
    State(state): State<Arc<ChinookState>>,
    query: Result<Query<GenreParams>, QueryRejection>,
) -> ApiResult<Response> {
    let params = extract(query)?;
    let literals = Literals::new().with("genre", params.genre()?);

    let format = params.format.unwrap_or(OutputFormat::Text);
    let result = run(&state, &CITY_BY_GENRE, CITY_BY_GENRE.filter_set(), literals, format).await?;
    render(result, "No such genre found")
}

async fn track_info_handler(
    State(state): State<Arc<ChinookState>>,
    query: Result<Query<TrackParams>, QueryRejection>,
) -> ApiResult<Response> {
    track(&state, &TRACK_INFO, extract(query)?).await
}

async fn track_duration_handler(
    State(state): State<Arc<ChinookState>>,
    query: Result<Query<TrackParams>, QueryRejection>,
) -> ApiResult<Response> {
    track(&state, &TRACK_INFO_WITH_DURATION, extract(query)?).await
}

async fn track(
    state: &ChinookState,
    template: &'static QueryTemplate,
    params: TrackParams,
) -> ApiResult<Response> {
    let literals = Literals::new().with("track_id", params.track_id()?);

    let format = params.format.unwrap_or(OutputFormat::Json);
    let result = run(state, template, template.filter_set(), literals, format).await?;
    render(result, "No such track found")
}

async fn sales_handler(
    State(state): State<Arc<ChinookState>>,
    query: Result<Query<SalesParams>, QueryRejection>,
) -> ApiResult<Response> {
    let params = extract(query)?;

    let mut filters = SALES_BY_COUNTRY.filter_set();
    filters.insert("BillingCountry", params.country()?)?;

    let format = params.format.unwrap_or(OutputFormat::Text);
    let result = run(&state, &SALES_BY_COUNTRY, filters, Literals::new(), format).await?;
    render(result, "No sales found")
}
