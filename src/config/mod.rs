// Configuration module entry point
// Loads layered configuration and holds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, ContentConfig, HttpConfig, JobsConfig, LoggingConfig, PerformanceConfig, ServerConfig,
};

/// Default config file (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load `config.toml` from the working directory, environment and defaults
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from the given file path (without extension)
    ///
    /// The file is optional. `WEBTOOLS_SECTION__KEY` environment variables
    /// override it, e.g. `WEBTOOLS_SERVER__PORT=9090`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("WEBTOOLS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "webtools/0.1")?
            .set_default("http.charset", "UTF-8")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("http.filters", vec!["method", "body_size"])?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does-not-exist/webtools-test").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.http.charset, "UTF-8");
        assert_eq!(cfg.http.filters, ["method", "body_size"]);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.content.files.is_empty());
        assert_eq!(cfg.jobs.hello_interval_secs, None);
        assert_eq!(cfg.get_socket_addr().unwrap().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_environment_override() {
        // No other test reads performance.max_connections
        std::env::set_var("WEBTOOLS_PERFORMANCE__MAX_CONNECTIONS", "777");
        let cfg = Config::load_from("does-not-exist/webtools-env");
        std::env::remove_var("WEBTOOLS_PERFORMANCE__MAX_CONNECTIONS");

        assert_eq!(cfg.unwrap().performance.max_connections, Some(777));
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("webtools-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("site.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9191

[http]
charset = ""
filters = ["method"]

[content.files]
"/app.js" = "static/app.js"

[jobs]
hello_interval_secs = 5
"#,
        )
        .unwrap();

        let base = dir.join("site");
        let cfg = Config::load_from(base.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9191);
        assert_eq!(cfg.http.charset, "");
        assert_eq!(cfg.http.filters, ["method"]);
        assert_eq!(cfg.content.files["/app.js"], "static/app.js");
        assert_eq!(cfg.jobs.hello_interval_secs, Some(5));
        assert_eq!(cfg.jobs.hello_id, "1");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
