// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::collections::HashMap;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    /// Charset qualifier for cached text content, empty for none
    pub charset: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
    /// Filter names run before routing, in order
    pub filters: Vec<String>,
}

/// Cached text resources
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ContentConfig {
    /// Request path -> file on disk
    #[serde(default)]
    pub files: HashMap<String, String>,
}

/// Scheduled job configuration
#[derive(Debug, Deserialize, Clone)]
pub struct JobsConfig {
    /// Run the hello job at this interval; disabled when unset or 0
    #[serde(default)]
    pub hello_interval_secs: Option<u64>,
    /// `id` entry in the hello job's data map
    #[serde(default = "default_hello_id")]
    pub hello_id: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_hello_id() -> String {
    "1".to_string()
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            hello_interval_secs: None,
            hello_id: default_hello_id(),
        }
    }
}
