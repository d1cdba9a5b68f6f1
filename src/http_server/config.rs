//! HTTP Server Configuration
//!
//! Configuration for the HTTP server (host, port, CORS), the CSV files used by
//! the student routes and the external services the lookup routes call.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host to bind to (default: "127.0.0.1")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 5001)
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS allowed origins (default: none, i.e. permissive)
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Student CSV files
    #[serde(default)]
    pub stats: StatsConfig,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5001
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            stats: StatsConfig::default(),
        }
    }
}

impl HttpServerConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Files read and written by the student routes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Height/weight survey read by `/average-statistics`
    #[serde(default = "default_heights_csv")]
    pub heights_csv: PathBuf,

    /// Output of `/generate-students`, overwritten on every call
    #[serde(default = "default_students_csv")]
    pub students_csv: PathBuf,

    /// bcrypt work factor for generated passwords
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_heights_csv() -> PathBuf {
    PathBuf::from("hw.csv")
}

fn default_students_csv() -> PathBuf {
    PathBuf::from("students.csv")
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            heights_csv: default_heights_csv(),
            students_csv: default_students_csv(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

/// External service endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// BitPay base URL (rates and currencies)
    #[serde(default = "default_bitpay_base_url")]
    pub bitpay_base_url: String,

    /// Open Notify astronaut roster URL
    #[serde(default = "default_open_notify_url")]
    pub open_notify_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_bitpay_base_url() -> String {
    "https://bitpay.com".to_string()
}

fn default_open_notify_url() -> String {
    "http://api.open-notify.org/astros.json".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            bitpay_base_url: default_bitpay_base_url(),
            open_notify_url: default_open_notify_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
