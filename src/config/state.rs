// Application state module
// Shared, read-mostly state handed to every connection

use std::sync::Arc;

use super::types::Config;
use crate::filter::{BodySizeFilter, FilterRegistry, MethodFilter, RequestFilter};
use crate::handler::ContentStore;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Named request filters, built at startup and cleared on shutdown
    pub filters: FilterRegistry,
    /// Cached text resources served through the conditional emitter
    pub content: ContentStore,
    /// Filter chain resolved from `http.filters`
    chain: Vec<Arc<dyn RequestFilter>>,
    access_log: bool,
}

impl AppState {
    /// Create state with the built-in filters registered
    pub fn new(config: Config, content: ContentStore) -> Self {
        let filters = FilterRegistry::new();
        filters.register(
            MethodFilter::NAME,
            Arc::new(MethodFilter::new(config.http.enable_cors)),
        );
        filters.register(
            BodySizeFilter::NAME,
            Arc::new(BodySizeFilter::new(config.http.max_body_size)),
        );

        let chain = filters.chain(&config.http.filters);
        let access_log = config.logging.access_log;

        Self {
            config,
            filters,
            content,
            chain,
            access_log,
        }
    }

    pub fn filter_chain(&self) -> &[Arc<dyn RequestFilter>] {
        &self.chain
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.access_log
    }

    /// Release registered filters
    pub fn teardown(&self) {
        self.filters.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::load_from("does-not-exist/webtools-state").unwrap()
    }

    #[test]
    fn test_access_log_follows_config() {
        let mut cfg = config();
        cfg.logging.access_log = false;
        assert!(!AppState::new(cfg, ContentStore::new()).access_log_enabled());

        let mut cfg = config();
        cfg.logging.access_log = true;
        assert!(AppState::new(cfg, ContentStore::new()).access_log_enabled());
    }

    #[test]
    fn test_chain_follows_configured_order() {
        let mut cfg = config();
        cfg.http.filters = vec!["body_size".to_string(), "missing".to_string(), "method".to_string()];
        let state = AppState::new(cfg, ContentStore::new());

        let names: Vec<&str> = state.filter_chain().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["body_size", "method"]);
    }
}
