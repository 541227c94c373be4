//! Request URL module
//!
//! Reconstructs the externally visible URL of a request.

use crate::http::RequestView;

/// Split `host[:port]`, keeping IPv6 brackets on the host
fn split_host_port(authority: &str) -> (&str, Option<u16>) {
    // userinfo never belongs in the rebuilt URL
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);

    if host_port.starts_with('[') {
        return match host_port.find(']') {
            Some(end) => {
                let port = host_port[end + 1..]
                    .strip_prefix(':')
                    .and_then(|p| p.parse().ok());
                (&host_port[..=end], port)
            }
            None => (host_port, None),
        };
    }

    match host_port.rsplit_once(':') {
        Some((host, port)) => match port.parse() {
            Ok(p) => (host, Some(p)),
            Err(_) => (host_port, None),
        },
        None => (host_port, None),
    }
}

fn default_port(scheme: &str) -> u16 {
    if scheme.eq_ignore_ascii_case("https") {
        443
    } else {
        80
    }
}

/// `scheme://host[:port]`, never ending in `/`
///
/// The port is omitted when it is the scheme's default.
pub fn server_url<R: RequestView + ?Sized>(request: &R) -> String {
    let scheme = request
        .scheme()
        .or_else(|| request.header("X-Forwarded-Proto"))
        .unwrap_or("http");
    let authority = request
        .authority()
        .or_else(|| request.header("Host"))
        .unwrap_or("localhost");

    let (host, port) = split_host_port(authority);
    match port {
        Some(p) if p != default_port(scheme) => format!("{scheme}://{host}:{p}"),
        _ => format!("{scheme}://{host}"),
    }
}

/// Full request URL including the query string, when it is not blank
pub fn request_url_with_query<R: RequestView + ?Sized>(request: &R) -> String {
    let url = format!("{}{}", server_url(request), request.request_uri());
    match request.query_string() {
        Some(query) if !query.trim().is_empty() => format!("{url}?{query}"),
        _ => url,
    }
}
