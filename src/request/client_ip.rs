//! Client address module
//!
//! Resolves the originating client IP behind reverse proxies.

use std::net::IpAddr;

use crate::http::RequestView;

/// Proxy headers consulted in order
const PROXY_HEADERS: [&str; 4] = [
    "X-Forwarded-For",
    "Proxy-Client-IP",
    "WL-Proxy-Client-IP",
    "X-Real-IP",
];

fn is_valid(ip: &str) -> bool {
    !ip.is_empty() && !ip.eq_ignore_ascii_case("unknown")
}

/// First usable entry of a possibly comma-separated proxy header
///
/// With several proxies in the path the client comes first:
/// `client, proxy1, proxy2`.
fn first_valid(value: &str) -> Option<&str> {
    value.split(',').map(str::trim).find(|ip| is_valid(ip))
}

/// Client IP as reported by proxy headers, else the socket peer address
///
/// # Examples
/// ```
/// use std::net::{IpAddr, Ipv4Addr};
/// use webtools::request::client_ip;
///
/// let req = hyper::Request::builder()
///     .header("X-Forwarded-For", "unknown, 192.168.1.110, 192.168.1.120")
///     .body(())
///     .unwrap();
/// let peer = IpAddr::V4(Ipv4Addr::LOCALHOST);
/// assert_eq!(client_ip(&req, peer), "192.168.1.110");
/// ```
pub fn client_ip<R: RequestView + ?Sized>(request: &R, remote_addr: IpAddr) -> String {
    PROXY_HEADERS
        .iter()
        .find_map(|name| request.header(name).and_then(first_valid))
        .map_or_else(|| remote_addr.to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::Request;
    use std::net::Ipv4Addr;

    const PEER: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9));

    fn with_headers(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_falls_back_to_peer() {
        assert_eq!(client_ip(&with_headers(&[]), PEER), "10.0.0.9");
        assert_eq!(
            client_ip(&with_headers(&[("X-Forwarded-For", "unknown")]), PEER),
            "10.0.0.9"
        );
    }

    #[test]
    fn test_forwarded_for_first_entry() {
        let req = with_headers(&[("X-Forwarded-For", "192.168.1.110, 192.168.1.120, 192.168.1.130")]);
        assert_eq!(client_ip(&req, PEER), "192.168.1.110");
    }

    #[test]
    fn test_header_precedence() {
        let req = with_headers(&[
            ("X-Real-IP", "4.4.4.4"),
            ("WL-Proxy-Client-IP", "3.3.3.3"),
            ("Proxy-Client-IP", "unknown"),
        ]);
        assert_eq!(client_ip(&req, PEER), "3.3.3.3");

        let req = with_headers(&[("X-Real-IP", "4.4.4.4"), ("X-Forwarded-For", "")]);
        assert_eq!(client_ip(&req, PEER), "4.4.4.4");
    }

    #[test]
    fn test_entries_returned_verbatim() {
        let req = with_headers(&[("X-Forwarded-For", " , proxy.internal, 192.168.1.120")]);
        assert_eq!(client_ip(&req, PEER), "proxy.internal");
    }

    #[test]
    fn test_unknown_is_case_insensitive() {
        let req = with_headers(&[("X-Forwarded-For", "UNKNOWN"), ("X-Real-IP", "8.8.8.8")]);
        assert_eq!(client_ip(&req, PEER), "8.8.8.8");
    }
}
