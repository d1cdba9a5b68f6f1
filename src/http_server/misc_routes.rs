//! Miscellaneous Routes
//!
//! Greeting, clock and password endpoints. None of them touch the store.

use axum::{
    extract::{rejection::QueryRejection, Query},
    response::Html,
    routing::get,
    Router,
};
use rand::seq::SliceRandom;
use rand::Rng;

use super::errors::{ApiError, ApiResult};
use super::params::PasswordParams;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const PUNCTUATION: &[u8] = b"!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

const CHARACTER_CLASSES: [&[u8]; 4] = [LOWERCASE, UPPERCASE, DIGITS, PUNCTUATION];

/// Length range for `/password-generator`
pub const GENERATED_PASSWORD_LEN: std::ops::RangeInclusive<usize> = 10..=20;

/// Create the miscellaneous routes
pub fn misc_routes() -> Router {
    Router::new()
        .route("/", get(hello_world_handler))
        .route("/hello", get(hello_handler))
        .route("/now", get(now_handler))
        .route("/password-generator", get(password_generator_handler))
        .route("/get-password_generator", get(sized_password_handler))
}

async fn hello_world_handler() -> Html<&'static str> {
    Html("<p>Hello, World!</p>")
}

async fn hello_handler() -> Html<&'static str> {
    Html("<p>Hello, Dima!</p>")
}

async fn now_handler() -> String {
    format!(
        "Current time: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f")
    )
}

async fn password_generator_handler() -> String {
    let password = generate_password(&mut rand::thread_rng());
    format!("Generated password: {}", password)
}

async fn sized_password_handler(
    query: Result<Query<PasswordParams>, QueryRejection>,
) -> ApiResult<String> {
    let Query(params) = query.map_err(|rejection| ApiError::InvalidQuery(rejection.body_text()))?;
    let length = params.length()?;
    Ok(generate_alphanumeric(&mut rand::thread_rng(), length))
}

/// A 10-20 character password with at least one character of every class
pub fn generate_password<R: Rng>(rng: &mut R) -> String {
    let length = rng.gen_range(GENERATED_PASSWORD_LEN);

    let mut chars: Vec<u8> = CHARACTER_CLASSES
        .iter()
        .filter_map(|class| class.choose(rng).copied())
        .collect();

    let all: Vec<u8> = CHARACTER_CLASSES.concat();
    while chars.len() < length {
        if let Some(c) = all.choose(rng) {
            chars.push(*c);
        }
    }
    chars.shuffle(rng);

    chars.into_iter().map(char::from).collect()
}

/// `length` characters drawn from letters and digits
pub fn generate_alphanumeric<R: Rng>(rng: &mut R, length: usize) -> String {
    let alphabet: Vec<u8> = [LOWERCASE, UPPERCASE, DIGITS].concat();
    (0..length)
        .filter_map(|_| alphabet.choose(rng).map(|c| char::from(*c)))
        .collect()
}
