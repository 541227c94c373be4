//! Built-in request filters
//!
//! Method allow-listing and request body size limits.

use hyper::Method;

use super::{FilterAction, RequestFilter, RequestInfo};
use crate::http;
use crate::logger;

/// Allows GET, HEAD and POST, answers OPTIONS, rejects everything else with 405
pub struct MethodFilter {
    enable_cors: bool,
}

impl MethodFilter {
    pub const NAME: &'static str = "method";

    pub const fn new(enable_cors: bool) -> Self {
        Self { enable_cors }
    }
}

impl RequestFilter for MethodFilter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn check(&self, request: &RequestInfo<'_>) -> FilterAction {
        match *request.method {
            Method::GET | Method::HEAD | Method::POST => FilterAction::Continue,
            Method::OPTIONS => FilterAction::Respond(http::build_options_response(self.enable_cors)),
            ref other => {
                logger::log_warning(&format!("Method not allowed: {other}"));
                FilterAction::Respond(http::build_405_response())
            }
        }
    }
}

/// Rejects requests whose Content-Length exceeds the limit with 413
pub struct BodySizeFilter {
    max_body_size: u64,
}

impl BodySizeFilter {
    pub const NAME: &'static str = "body_size";

    pub const fn new(max_body_size: u64) -> Self {
        Self { max_body_size }
    }
}

impl RequestFilter for BodySizeFilter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn check(&self, request: &RequestInfo<'_>) -> FilterAction {
        let Some(value) = request.headers.get("content-length") else {
            return FilterAction::Continue;
        };
        let Ok(size_str) = value.to_str() else {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            return FilterAction::Continue;
        };
        match size_str.parse::<u64>() {
            Ok(size) if size > self.max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {})",
                    self.max_body_size
                ));
                FilterAction::Respond(http::build_413_response())
            }
            Ok(_) => FilterAction::Continue,
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                FilterAction::Continue
            }
        }
    }
}
