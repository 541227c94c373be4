//! Request filter module
//!
//! Named request filters held in an explicit registry that the application
//! state owns from startup to shutdown.

mod builtin;
mod registry;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::HeaderMap;
use hyper::{Method, Response};
use std::sync::Arc;

pub use builtin::{BodySizeFilter, MethodFilter};
pub use registry::FilterRegistry;

/// What a filter sees of a request
#[derive(Debug, Clone, Copy)]
pub struct RequestInfo<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub headers: &'a HeaderMap,
}

/// Filter decision
#[derive(Debug)]
pub enum FilterAction {
    /// Hand the request to the next filter or the router
    Continue,
    /// Answer immediately with this response
    Respond(Response<Full<Bytes>>),
}

/// A request filter run before routing
pub trait RequestFilter: Send + Sync {
    fn name(&self) -> &str;

    fn check(&self, request: &RequestInfo<'_>) -> FilterAction;
}

/// Run filters in order, stopping at the first that responds
pub fn run_chain(
    filters: &[Arc<dyn RequestFilter>],
    request: &RequestInfo<'_>,
) -> Option<Response<Full<Bytes>>> {
    filters
        .iter()
        .find_map(|filter| match filter.check(request) {
            FilterAction::Continue => None,
            FilterAction::Respond(resp) => Some(resp),
        })
}
