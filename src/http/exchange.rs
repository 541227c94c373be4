//! Request/response exchange module
//!
//! A read-only request view and a write-only response sink, so the caching and
//! request helpers work over any request type and never touch hyper builders directly.

use chrono::{DateTime, Utc};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use hyper::{Request, Response, StatusCode};
use std::io;

use super::cache::format_http_date;
use crate::logger;

/// Read-only view of an incoming request
pub trait RequestView {
    /// Header value by name (case-insensitive), `None` when absent or not visible ASCII
    fn header(&self, name: &str) -> Option<&str>;

    /// Request path without the query string
    fn request_uri(&self) -> &str;

    /// Raw query string without the leading `?`
    fn query_string(&self) -> Option<&str>;

    /// URI scheme when the request target is in absolute form
    fn scheme(&self) -> Option<&str> {
        None
    }

    /// URI authority when the request target is in absolute form
    fn authority(&self) -> Option<&str> {
        None
    }
}

impl<B> RequestView for Request<B> {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name).and_then(|v| v.to_str().ok())
    }

    fn request_uri(&self) -> &str {
        self.uri().path()
    }

    fn query_string(&self) -> Option<&str> {
        self.uri().query()
    }

    fn scheme(&self) -> Option<&str> {
        self.uri().scheme_str()
    }

    fn authority(&self) -> Option<&str> {
        self.uri().authority().map(hyper::http::uri::Authority::as_str)
    }
}

/// Write-only response sink
pub trait ResponseSink {
    /// Replace all values of a header
    fn set_header(&mut self, name: &str, value: &str);

    /// Append a header value, keeping existing ones
    fn add_header(&mut self, name: &str, value: &str);

    fn set_status(&mut self, status: u16);

    /// Set a header to an HTTP date (`Mon, 01 Jan 2024 00:00:00 GMT`)
    fn set_date_header(&mut self, name: &str, date: DateTime<Utc>) {
        self.set_header(name, &format_http_date(date));
    }

    /// Append text to the response body
    fn write(&mut self, content: &str) -> io::Result<()>;
}

/// In-memory response that is turned into a hyper response once complete
///
/// The status stays unset until someone sets it, and converts to 200.
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header as text
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// True when no status, header or body byte has been written
    pub fn is_untouched(&self) -> bool {
        self.status.is_none() && self.headers.is_empty() && self.body.is_empty()
    }

    /// Convert into a hyper response, defaulting the status to 200
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(Bytes::from(self.body)));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseSink for BufferedResponse {
    fn set_header(&mut self, name: &str, value: &str) {
        if let Some((name, value)) = parse_header(name, value) {
            self.headers.insert(name, value);
        }
    }

    fn add_header(&mut self, name: &str, value: &str) {
        if let Some((name, value)) = parse_header(name, value) {
            self.headers.append(name, value);
        }
    }

    fn set_status(&mut self, status: u16) {
        match StatusCode::from_u16(status) {
            Ok(code) => self.status = Some(code),
            Err(e) => logger::log_error(&format!("Invalid status code {status}: {e}")),
        }
    }

    fn write(&mut self, content: &str) -> io::Result<()> {
        self.body.extend_from_slice(content.as_bytes());
        Ok(())
    }
}

/// Validate a header pair, logging and dropping it when invalid
fn parse_header(name: &str, value: &str) -> Option<(HeaderName, HeaderValue)> {
    let header_name = match HeaderName::from_bytes(name.as_bytes()) {
        Ok(n) => n,
        Err(e) => {
            logger::log_error(&format!("Invalid header name '{name}': {e}"));
            return None;
        }
    };
    match HeaderValue::from_str(value) {
        Ok(v) => Some((header_name, v)),
        Err(e) => {
            logger::log_error(&format!("Invalid value for header '{name}': {e}"));
            None
        }
    }
}
