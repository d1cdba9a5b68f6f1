//! Student Routes
//!
//! `/average-statistics` summarizes a height/weight survey CSV.
//! `/generate-students` makes up a batch of students, stores them as CSV and
//! echoes them back as HTML.

use std::fs::File;
use std::io::{Read, Write};
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Html,
    routing::get,
    Router,
};
use chrono::{Duration, NaiveDate, Utc};
use fake::faker::chrono::en::DateTimeBetween;
use fake::faker::internet::en::{Password, SafeEmail};
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rand::Rng;
use serde::Serialize;

use super::config::StatsConfig;
use super::errors::{ApiError, ApiResult};
use super::params::StudentParams;

/// Survey columns averaged by `/average-statistics`
pub const HEIGHT_COLUMN: &str = "Height(Inches)";
pub const WEIGHT_COLUMN: &str = "Weight(Pounds)";

/// Oldest generated birthday, in years before today
const MAX_AGE_YEARS: i64 = 115;

/// State shared by the student routes
pub struct StatsState {
    pub config: StatsConfig,
}

impl StatsState {
    pub fn new(config: StatsConfig) -> Self {
        Self { config }
    }
}

/// Create the student routes
pub fn stats_routes(state: Arc<StatsState>) -> Router {
    Router::new()
        .route("/average-statistics", get(average_statistics_handler))
        .route("/generate-students", get(generate_students_handler))
        .with_state(state)
}

// ==================
// Survey Averages
// ==================

/// Mean height and weight over every survey row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurveyAverages {
    pub height: f64,
    pub weight: f64,
}

impl SurveyAverages {
    /// `Average height: X, Average weight: Y`, both rounded to 2 places
    pub fn render(&self) -> String {
        format!(
            "Average height: {:?}, Average weight: {:?}",
            round2(self.height),
            round2(self.weight)
        )
    }
}

#[derive(Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn csv_error(err: csv::Error) -> ApiError {
    ApiError::Internal(format!("CSV error: {}", err))
}

/// Header names are compared without surrounding spaces or quotes
fn column_index(headers: &csv::StringRecord, name: &str) -> ApiResult<usize> {
    headers
        .iter()
        .position(|h| h.trim().trim_matches('"') == name)
        .ok_or_else(|| ApiError::Internal(format!("Survey has no '{}' column", name)))
}

fn parse_measurement(column: &str, raw: &str) -> ApiResult<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| ApiError::Internal(format!("Non-numeric {} value '{}'", column, raw)))
}

/// Average the height and weight columns of a survey CSV.
///
/// Blank cells are skipped. A survey with no measurements is `NotFound`.
pub fn average_statistics<R: Read>(source: R) -> ApiResult<SurveyAverages> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers().map_err(csv_error)?.clone();
    let height_idx = column_index(&headers, HEIGHT_COLUMN)?;
    let weight_idx = column_index(&headers, WEIGHT_COLUMN)?;

    let mut height = Mean::default();
    let mut weight = Mean::default();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if let Some(h) = parse_measurement(HEIGHT_COLUMN, record.get(height_idx).unwrap_or(""))? {
            height.push(h);
        }
        if let Some(w) = parse_measurement(WEIGHT_COLUMN, record.get(weight_idx).unwrap_or(""))? {
            weight.push(w);
        }
    }

    match (height.value(), weight.value()) {
        (Some(height), Some(weight)) => Ok(SurveyAverages { height, weight }),
        _ => Err(ApiError::NotFound("No survey data found".to_string())),
    }
}

// ==================
// Student Generation
// ==================

/// One generated student, in `students.csv` column order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Student {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub birthday: NaiveDate,
}

/// `count` students sharing one bcrypt-hashed password
pub fn generate_students<R: Rng>(
    rng: &mut R,
    count: u32,
    bcrypt_cost: u32,
) -> ApiResult<Vec<Student>> {
    let password: String = Password(8..16).fake_with_rng(rng);
    let hashed = bcrypt::hash(password, bcrypt_cost)
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))?;

    let now = Utc::now();
    let oldest = now - Duration::days(MAX_AGE_YEARS * 365);

    let students = (0..count)
        .map(|_| Student {
            first_name: FirstName().fake_with_rng(rng),
            last_name: LastName().fake_with_rng(rng),
            email: SafeEmail().fake_with_rng(rng),
            password: hashed.clone(),
            birthday: DateTimeBetween(oldest, now)
                .fake_with_rng::<chrono::DateTime<Utc>, _>(rng)
                .date_naive(),
        })
        .collect();

    Ok(students)
}

/// Write students with a header row
pub fn write_students<W: Write>(out: W, students: &[Student]) -> ApiResult<()> {
    let mut writer = csv::Writer::from_writer(out);
    for student in students {
        writer.serialize(student).map_err(csv_error)?;
    }
    writer
        .flush()
        .map_err(|e| ApiError::Internal(format!("Failed to write students: {}", e)))
}

/// One `<p>` paragraph per student, each followed by ` <br>`
pub fn render_students(students: &[Student]) -> String {
    students
        .iter()
        .map(|s| {
            format!(
                "<p>First name: {}, Last name: {}, Email: {}, Password {}, Birthday {}</p> <br>",
                s.first_name, s.last_name, s.email, s.password, s.birthday
            )
        })
        .collect()
}

// ==================
// Handlers
// ==================

async fn average_statistics_handler(State(state): State<Arc<StatsState>>) -> ApiResult<String> {
    let path = state.config.heights_csv.clone();
    let averages = tokio::task::spawn_blocking(move || {
        let file = File::open(&path).map_err(|e| {
            ApiError::Internal(format!("Failed to open {}: {}", path.display(), e))
        })?;
        average_statistics(file)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Statistics task failed: {}", e)))??;

    Ok(averages.render())
}

async fn generate_students_handler(
    State(state): State<Arc<StatsState>>,
    query: Result<Query<StudentParams>, QueryRejection>,
) -> ApiResult<Html<String>> {
    let Query(params) = query.map_err(|rejection| ApiError::InvalidQuery(rejection.body_text()))?;
    let count = params.count()?;
    let config = state.config.clone();

    let students = tokio::task::spawn_blocking(move || {
        let students = generate_students(&mut rand::thread_rng(), count, config.bcrypt_cost)?;
        let file = File::create(&config.students_csv).map_err(|e| {
            ApiError::Internal(format!(
                "Failed to create {}: {}",
                config.students_csv.display(),
                e
            ))
        })?;
        write_students(file, &students)?;
        Ok::<_, ApiError>(students)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Student task failed: {}", e)))??;

    tracing::info!(count, "generated students");
    Ok(Html(render_students(&students)))
}
