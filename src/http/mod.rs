//! HTTP protocol layer module
//!
//! Request/response abstractions, cache validators and the conditional emitter,
//! decoupled from routing and server concerns.

pub mod cache;
pub mod conditional;
pub mod exchange;
pub mod mime;
pub mod response;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const ETAG: &str = "ETag";
pub const IF_NONE_MATCH: &str = "If-None-Match";
pub const IF_MODIFIED_SINCE: &str = "If-Modified-Since";
pub const LAST_MODIFIED: &str = "Last-Modified";

// Re-export commonly used types
pub use conditional::{emit, emit_cached, CachedContent};
pub use exchange::{BufferedResponse, RequestView, ResponseSink};
pub use response::{
    build_404_response, build_405_response, build_413_response, build_500_response,
    build_options_response,
};
