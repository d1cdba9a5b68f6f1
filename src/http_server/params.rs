//! # Endpoint Parameters
//!
//! Query-string schemas for each route and their validation rules. Handlers
//! only pass parameters on to the query pipeline after `validate` succeeds.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use super::errors::{ApiError, ApiResult};

/// Default track when none is requested
pub const DEFAULT_TRACK_ID: i64 = 1;

/// Minimum genre name length
pub const MIN_GENRE_LEN: usize = 3;

/// Bounds for the requested password length
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 100;

/// Bounds and default for the number of generated students
pub const MIN_STUDENTS: u32 = 1;
pub const MAX_STUDENTS: u32 = 1000;
pub const DEFAULT_STUDENTS: u32 = 5;

type CompiledPattern = OnceLock<Result<Regex, regex::Error>>;

/// Compile `source` into `cell` on first use
fn pattern(cell: &'static CompiledPattern, source: &str) -> ApiResult<&'static Regex> {
    cell.get_or_init(|| Regex::new(source))
        .as_ref()
        .map_err(|e| ApiError::Internal(format!("Invalid pattern '{}': {}", source, e)))
}

fn letters() -> ApiResult<&'static Regex> {
    static LETTERS: CompiledPattern = OnceLock::new();
    pattern(&LETTERS, "^[a-zA-Z]+$")
}

/// Letters with single spaces between words, e.g. "United Kingdom"
fn words() -> ApiResult<&'static Regex> {
    static WORDS: CompiledPattern = OnceLock::new();
    pattern(&WORDS, "^[a-zA-Z]+( [a-zA-Z]+)*$")
}

fn check_letters(field: &str, value: &str) -> ApiResult<()> {
    if letters()?.is_match(value) {
        Ok(())
    } else {
        Err(ApiError::validation(field, "must contain only ASCII letters"))
    }
}

/// Treat `?name=` the same as an absent parameter
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Output format requested with `?format=`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Text,
}

/// `/get-customers`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerParams {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub format: Option<OutputFormat>,
}

impl CustomerParams {
    pub fn validate(&self) -> ApiResult<()> {
        if let Some(first_name) = non_empty(&self.first_name) {
            check_letters("first_name", first_name)?;
        }
        Ok(())
    }

    pub fn first_name(&self) -> Option<&str> {
        non_empty(&self.first_name)
    }

    pub fn last_name(&self) -> Option<&str> {
        non_empty(&self.last_name)
    }
}

/// `/stats-by-city`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenreParams {
    pub genre: Option<String>,
    pub format: Option<OutputFormat>,
}

impl GenreParams {
    /// The validated genre name
    pub fn genre(&self) -> ApiResult<&str> {
        let genre = non_empty(&self.genre).ok_or_else(|| ApiError::MissingParam("genre".to_string()))?;
        check_letters("genre", genre)?;
        if genre.len() < MIN_GENRE_LEN {
            return Err(ApiError::validation(
                "genre",
                format!("must be at least {} characters", MIN_GENRE_LEN),
            ));
        }
        Ok(genre)
    }
}

/// `/get-all-info-about-track` and the duration variant
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackParams {
    pub track_id: Option<i64>,
    pub format: Option<OutputFormat>,
}

impl TrackParams {
    /// The validated track id, defaulting to the first track
    pub fn track_id(&self) -> ApiResult<i64> {
        let track_id = self.track_id.unwrap_or(DEFAULT_TRACK_ID);
        if track_id < 1 {
            return Err(ApiError::validation("track_id", "must be at least 1"));
        }
        Ok(track_id)
    }
}

/// `/sales`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesParams {
    pub country: Option<String>,
    pub format: Option<OutputFormat>,
}

impl SalesParams {
    /// The validated country, `None` meaning every country
    pub fn country(&self) -> ApiResult<Option<&str>> {
        match non_empty(&self.country) {
            Some(country) if words()?.is_match(country) => Ok(Some(country)),
            Some(_) => Err(ApiError::validation(
                "country",
                "must contain only ASCII letters and spaces",
            )),
            None => Ok(None),
        }
    }
}

/// `/get-password_generator`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordParams {
    pub length: Option<usize>,
}

impl PasswordParams {
    pub fn length(&self) -> ApiResult<usize> {
        let length = self
            .length
            .ok_or_else(|| ApiError::MissingParam("length".to_string()))?;
        if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&length) {
            return Err(ApiError::validation(
                "length",
                format!("must be between {} and {}", MIN_PASSWORD_LEN, MAX_PASSWORD_LEN),
            ));
        }
        Ok(length)
    }
}

/// `/generate-students`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentParams {
    pub count: Option<u32>,
}

impl StudentParams {
    pub fn count(&self) -> ApiResult<u32> {
        let count = self.count.unwrap_or(DEFAULT_STUDENTS);
        if !(MIN_STUDENTS..=MAX_STUDENTS).contains(&count) {
            return Err(ApiError::validation(
                "count",
                format!("must be between {} and {}", MIN_STUDENTS, MAX_STUDENTS),
            ));
        }
        Ok(count)
    }
}

/// `/bitcoin-rate`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrencyParams {
    pub currency: Option<String>,
}

impl CurrencyParams {
    pub fn currency(&self) -> ApiResult<&str> {
        let currency = non_empty(&self.currency).unwrap_or("USD");
        check_letters("currency", currency)?;
        Ok(currency)
    }
}
