//! Request echo endpoint
//!
//! Reports what the request helpers see: client IP, URLs and parameters.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::net::IpAddr;

use crate::http::{self, mime, BufferedResponse, RequestView, ResponseSink};
use crate::logger;
use crate::request;

pub const ECHO_PATH: &str = "/_echo";

/// Describe the request as JSON
///
/// `charset` selects how parameter values are decoded; it is also the JSON
/// Content-Type charset. `posted` is the raw body of a POST, if any.
pub fn serve_echo<R>(
    request: &R,
    remote_addr: IpAddr,
    charset: &str,
    posted: Option<&str>,
) -> Response<Full<Bytes>>
where
    R: RequestView + ?Sized,
{
    let charset = Some(charset).filter(|c| !c.is_empty());
    let body = serde_json::json!({
        "client_ip": request::client_ip(request, remote_addr),
        "server_url": request::server_url(request),
        "url": request::request_url_with_query(request),
        "params": request::request_parameter_map(request, charset),
        "body": posted,
    });

    let mut response = BufferedResponse::new();
    mime::add_json_content_type(&mut response, charset);
    match response.write(&body.to_string()) {
        Ok(()) => response.into_response(),
        Err(e) => {
            logger::log_error(&format!("Failed to write echo response: {e}"));
            http::build_500_response()
        }
    }
}
