//! HTTP Endpoint Tests
//!
//! Drives the full router with `oneshot` against the mini Chinook fixture.
//! Lookup routes talk to a local stand-in for the external services.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::extract::Path;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chinook_api::http_server::{
    HttpServer, HttpServerConfig, StatsConfig, UpstreamClient, UpstreamConfig,
};
use chinook_api::query::{QueryExecutor, SqliteExecutor};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::fixture_executor;

// =============================================================================
// Helpers
// =============================================================================

fn app_with(executor: Arc<dyn QueryExecutor>, upstream: UpstreamConfig) -> Router {
    let upstream = UpstreamClient::new(upstream).unwrap();
    HttpServer::new(HttpServerConfig::default(), executor, upstream).router()
}

/// Router whose student routes use files under `dir`
fn stats_app(dir: &std::path::Path) -> Router {
    let config = HttpServerConfig {
        stats: StatsConfig {
            heights_csv: dir.join("hw.csv"),
            students_csv: dir.join("students.csv"),
            bcrypt_cost: 4,
        },
        ..Default::default()
    };
    let upstream = UpstreamClient::new(UpstreamConfig::default()).unwrap();
    HttpServer::new(config, fixture_executor(), upstream).router()
}

fn app() -> Router {
    app_with(fixture_executor(), UpstreamConfig::default())
}

async fn get_response(app: Router, uri: &str) -> (StatusCode, String, String) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = get_response(app, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

/// Serve `router` on an ephemeral port and return its base URL
async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn fake_rate(Path(currency): Path<String>) -> Response {
    match currency.as_str() {
        "XXX" => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        "NOPE" => Json(json!({"code": "NOPE"})).into_response(),
        _ => Json(json!({"code": currency, "name": "US Dollar", "rate": 43210.5})).into_response(),
    }
}

async fn fake_currencies() -> Json<Value> {
    Json(json!({
        "data": [
            {"code": "USD", "symbol": "$", "name": "US Dollar"},
            {"code": "EUR", "symbol": "€", "name": "Euro"}
        ]
    }))
}

async fn fake_astros() -> Json<Value> {
    Json(json!({
        "message": "success",
        "number": 3,
        "people": [
            {"craft": "ISS", "name": "Oleg Kononenko"},
            {"craft": "ISS", "name": "Tracy Dyson"},
            {"craft": "Tiangong", "name": "Ye Guangfu"}
        ]
    }))
}

async fn lookup_app() -> Router {
    let base = spawn_upstream(
        Router::new()
            .route("/api/rates/:currency", get(fake_rate))
            .route("/currencies", get(fake_currencies))
            .route("/astros.json", get(fake_astros)),
    )
    .await;

    app_with(
        fixture_executor(),
        UpstreamConfig {
            bitpay_base_url: base.clone(),
            open_notify_url: format!("{}/astros.json", base),
            timeout_secs: 5,
        },
    )
}

// =============================================================================
// Customers
// =============================================================================

#[tokio::test]
async fn test_customers_by_first_name() {
    let (status, body) = get_json(app(), "/get-customers?first_name=Bob").await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["LastName"], "Smith");
    assert_eq!(rows[1]["LastName"], "Jones");
}

#[tokio::test]
async fn test_customers_preserve_column_order() {
    let (_, _, body) = get_response(app(), "/get-customers?first_name=Ann").await;

    let first = body.find("CustomerId").unwrap();
    let last = body.find("Country").unwrap();
    assert!(first < body.find("FirstName").unwrap());
    assert!(body.find("Email").unwrap() < last);
}

#[tokio::test]
async fn test_customers_as_text() {
    let (status, content_type, body) =
        get_response(app(), "/get-customers?last_name=Lee&format=text").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));
    assert_eq!(body, "3, Ann, Lee, ann@x.com, Germany");
}

#[tokio::test]
async fn test_customers_rejects_non_letters() {
    let (status, body) = get_json(app(), "/get-customers?first_name=B0b").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 422);
    assert!(body["error"].as_str().unwrap().contains("first_name"));
}

#[tokio::test]
async fn test_customers_not_found() {
    let (status, body) = get_json(app(), "/get-customers?first_name=Nobody").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No customers found");
}

// =============================================================================
// Genre Statistics
// =============================================================================

#[tokio::test]
async fn test_stats_by_city() {
    let (status, content_type, body) = get_response(app(), "/stats-by-city?genre=Rock").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));
    assert_eq!(body, "Rock, Boston, 3");
}

#[tokio::test]
async fn test_stats_by_city_as_json() {
    let (status, body) = get_json(app(), "/stats-by-city?genre=Jazz&format=json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"Genre": "Jazz", "City": "Berlin", "Purchases": 1}])
    );
}

#[tokio::test]
async fn test_stats_by_city_unknown_genre() {
    let (status, body) = get_json(app(), "/stats-by-city?genre=Polka").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No such genre found");
}

#[tokio::test]
async fn test_stats_by_city_requires_genre() {
    let (status, body) = get_json(app(), "/stats-by-city").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("genre"));

    let (status, _) = get_json(app(), "/stats-by-city?genre=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_by_city_validates_genre() {
    let (status, _) = get_json(app(), "/stats-by-city?genre=Ro").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = get_json(app(), "/stats-by-city?genre=Rock%27%20OR%201=1").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// =============================================================================
// Tracks
// =============================================================================

#[tokio::test]
async fn test_track_info_defaults_to_first_track() {
    let (status, body) = get_json(app(), "/get-all-info-about-track").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["TrackId"], 1);
    assert_eq!(body[0]["Artist"], "AC/DC");
}

#[tokio::test]
async fn test_track_info_by_id() {
    let (status, body) = get_json(app(), "/get-all-info-about-track?track_id=3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["Track"], "So What");
    assert_eq!(body[0]["Composer"], Value::Null);
}

#[tokio::test]
async fn test_track_info_rejects_bad_ids() {
    let (status, _) = get_json(app(), "/get-all-info-about-track?track_id=abc").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = get_json(app(), "/get-all-info-about-track?track_id=0").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_track_info_not_found() {
    let (status, body) = get_json(app(), "/get-all-info-about-track?track_id=99").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No such track found");
}

#[tokio::test]
async fn test_track_with_duration() {
    let (status, body) = get_json(
        app(),
        "/get-all-info-about-track-and-albums-in-hours?track_id=1",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["Time"], "5m:43s");
    assert_eq!(body[0]["AlbumHours"], 0.15);
}

// =============================================================================
// Sales
// =============================================================================

#[tokio::test]
async fn test_sales_every_country() {
    let (status, _, body) = get_response(app(), "/sales").await;

    assert_eq!(status, StatusCode::OK);
    let lines: Vec<_> = body.split("<br>").collect();
    assert_eq!(lines.len(), 3);
    assert!(lines.contains(&"2.97, USA"));
    assert!(lines.contains(&"0.99, Canada"));
    assert!(lines.contains(&"1.98, Germany"));
}

#[tokio::test]
async fn test_sales_one_country_as_json() {
    let (status, body) = get_json(app(), "/sales?country=USA&format=json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"Sales": 2.97, "BillingCountry": "USA"}]));
}

#[tokio::test]
async fn test_sales_unknown_country() {
    let (status, body) = get_json(app(), "/sales?country=France").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No sales found");
}

#[tokio::test]
async fn test_sales_rejects_bad_input() {
    let (status, _) = get_json(app(), "/sales?country=US4").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = get_json(app(), "/sales?format=xml").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_store_failure_is_server_error() {
    let empty = Arc::new(SqliteExecutor::with_connection(
        rusqlite::Connection::open_in_memory().unwrap(),
    ));
    let (status, body) = get_json(app_with(empty, UpstreamConfig::default()), "/sales").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 500);
}

// =============================================================================
// Leaf Routes
// =============================================================================

#[tokio::test]
async fn test_greetings() {
    let (status, _, body) = get_response(app(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<p>Hello, World!</p>");

    let (_, _, body) = get_response(app(), "/hello").await;
    assert_eq!(body, "<p>Hello, Dima!</p>");
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get_json(app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_now() {
    let (status, _, body) = get_response(app(), "/now").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("Current time: "));
}

#[tokio::test]
async fn test_password_generator() {
    let (status, _, body) = get_response(app(), "/password-generator").await;

    assert_eq!(status, StatusCode::OK);
    let password = body.strip_prefix("Generated password: ").unwrap();
    assert!((10..=20).contains(&password.len()));
}

#[tokio::test]
async fn test_sized_password() {
    let (status, _, body) = get_response(app(), "/get-password_generator?length=12").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.len(), 12);
    assert!(body.chars().all(|c| c.is_ascii_alphanumeric()));

    let (status, _, _) = get_response(app(), "/get-password_generator?length=5").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _, _) = get_response(app(), "/get-password_generator").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Student Routes
// =============================================================================

#[tokio::test]
async fn test_average_statistics() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("hw.csv"),
        "\"Index\", \"Height(Inches)\", \"Weight(Pounds)\"\n\
         1, 65.78, 112.99\n\
         2, 71.52, 136.49\n\
         3, 69.40, 153.03\n",
    )
    .unwrap();

    let (status, _, body) = get_response(stats_app(dir.path()), "/average-statistics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Average height: 68.9, Average weight: 134.17");
}

#[tokio::test]
async fn test_average_statistics_without_survey_file() {
    let dir = tempfile::tempdir().unwrap();

    let (status, body) = get_json(stats_app(dir.path()), "/average-statistics").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("hw.csv"));
}

#[tokio::test]
async fn test_generate_students_writes_csv() {
    let dir = tempfile::tempdir().unwrap();

    let (status, content_type, body) =
        get_response(stats_app(dir.path()), "/generate-students?count=3").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));
    assert_eq!(body.matches("<p>First name: ").count(), 3);
    assert_eq!(body.matches("</p> <br>").count(), 3);

    let written = std::fs::read_to_string(dir.path().join("students.csv")).unwrap();
    let lines: Vec<_> = written.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "first_name,last_name,email,password,birthday");
}

#[tokio::test]
async fn test_generate_students_defaults_to_five() {
    let dir = tempfile::tempdir().unwrap();

    let (status, _, body) = get_response(stats_app(dir.path()), "/generate-students").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.matches("</p> <br>").count(), 5);
}

#[tokio::test]
async fn test_generate_students_count_bounds() {
    let dir = tempfile::tempdir().unwrap();

    for uri in [
        "/generate-students?count=0",
        "/generate-students?count=1001",
        "/generate-students?count=many",
    ] {
        let (status, _) = get_json(stats_app(dir.path()), uri).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
    }
    assert!(!dir.path().join("students.csv").exists());

    let (status, _, _) = get_response(stats_app(dir.path()), "/generate-students?count=1000").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_text_output_is_html_escaped() {
    let conn = common::fixture_connection();
    conn.execute(
        "INSERT INTO customers VALUES (4, 'Eve', '<b>Evil</b>', 'eve@x.com', 'USA')",
        [],
    )
    .unwrap();
    let executor = Arc::new(SqliteExecutor::with_connection(conn));

    let (status, _, body) = get_response(
        app_with(executor, UpstreamConfig::default()),
        "/get-customers?first_name=Eve&format=text",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "4, Eve, &lt;b&gt;Evil&lt;/b&gt;, eve@x.com, USA");
}

// =============================================================================
// Lookup Routes
// =============================================================================

#[tokio::test]
async fn test_bitcoin_rate() {
    let app = lookup_app().await;

    let (status, _, body) = get_response(app.clone(), "/bitcoin-rate").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "The bitcoin rate is 43210.5 $");

    let (_, _, body) = get_response(app, "/bitcoin-rate?currency=EUR").await;
    assert_eq!(body, "The bitcoin rate is 43210.5 €");
}

#[tokio::test]
async fn test_bitcoin_rate_fallbacks() {
    let (status, _, body) = get_response(lookup_app().await, "/bitcoin-rate?currency=NOPE").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "The bitcoin rate is ? NOPE");
}

#[tokio::test]
async fn test_bitcoin_rate_upstream_failure() {
    let (status, body) = get_json(lookup_app().await, "/bitcoin-rate?currency=XXX").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "ERROR: Something went wrong.");
}

#[tokio::test]
async fn test_astronauts_by_craft() {
    let (status, body) = get_json(lookup_app().await, "/get-astronauts").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ISS": 2, "Tiangong": 1}));
}

#[tokio::test]
async fn test_lookup_unreachable_is_bad_gateway() {
    let config = UpstreamConfig {
        bitpay_base_url: "http://127.0.0.1:1".to_string(),
        open_notify_url: "http://127.0.0.1:1/astros.json".to_string(),
        timeout_secs: 2,
    };
    let (status, _) = get_json(app_with(fixture_executor(), config), "/get-astronauts").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
