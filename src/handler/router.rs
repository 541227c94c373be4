//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: filter chain, route dispatch,
//! HEAD handling and access logging.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, REFERER, SERVER, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::error::Error;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use super::content;
use super::echo::{self, ECHO_PATH};
use crate::config::AppState;
use crate::filter::{self, RequestInfo};
use crate::http::{self, RequestView};
use crate::logger::{self, AccessLogEntry};
use crate::request;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let head = Request::from_parts(parts, ());

    // 1. Filter chain
    let info = RequestInfo {
        method: head.method(),
        path: head.uri().path(),
        headers: head.headers(),
    };
    let response = match filter::run_chain(state.filter_chain(), &info) {
        Some(resp) => resp,
        // 2. Route
        None => route(&head, body, &state, peer_addr.ip()).await,
    };

    // 3. Finalize
    let mut response = if head.method() == Method::HEAD {
        strip_body(response)
    } else {
        response
    };
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if state.access_log_enabled() {
        log_access(&head, &response, peer_addr.ip(), started, &state);
    }

    Ok(response)
}

/// Dispatch to the echo endpoint or the cached content
async fn route<B>(
    head: &Request<()>,
    body: B,
    state: &AppState,
    remote_addr: IpAddr,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    let charset = state.config.http.charset.as_str();

    if head.request_uri() == ECHO_PATH {
        let posted = if head.method() == Method::POST {
            let limit = usize::try_from(state.config.http.max_body_size).unwrap_or(usize::MAX);
            match request::raw_post_data_limited(body, limit).await {
                Ok(text) => Some(text),
                Err(e) => {
                    logger::log_error(&format!("Rejected {}: {e}", head.request_uri()));
                    return http::build_413_response();
                }
            }
        } else {
            None
        };
        return echo::serve_echo(head, remote_addr, charset, posted.as_deref());
    }

    if head.method() == Method::POST {
        return http::build_405_response();
    }

    content::serve_cached(&state.content, head).unwrap_or_else(http::build_404_response)
}

/// Drop the body of a HEAD response, keeping its headers
fn strip_body(response: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    let (parts, _) = response.into_parts();
    Response::from_parts(parts, Full::new(Bytes::new()))
}

fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

fn log_access(
    head: &Request<()>,
    response: &Response<Full<Bytes>>,
    remote_addr: IpAddr,
    started: Instant,
    state: &AppState,
) {
    let mut entry = AccessLogEntry::new(
        request::client_ip(head, remote_addr),
        head.method().to_string(),
        head.uri().path().to_string(),
    );
    entry.query = head.uri().query().map(ToString::to_string);
    entry.http_version = version_str(head.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
        .unwrap_or(usize::MAX);
    entry.referer = head.header(REFERER.as_str()).map(ToString::to_string);
    entry.user_agent = head.header(USER_AGENT.as_str()).map(ToString::to_string);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::handler::ContentStore;
    use crate::http::CachedContent;
    use chrono::{TimeZone, Utc};
    use http_body_util::BodyExt;
    use std::net::Ipv4Addr;

    const PEER: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 40000);

    fn test_state() -> Arc<AppState> {
        let mut config = Config::load_from("does-not-exist/webtools-router").unwrap();
        config.logging.access_log = false;
        config.http.max_body_size = 64;

        let mut store = ContentStore::new();
        store.insert(
            "/app.js",
            CachedContent::new("run();", "UTF-8")
                .with_last_modified(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        );
        Arc::new(AppState::new(config, store))
    }

    async fn send(req: Request<Full<Bytes>>, state: &Arc<AppState>) -> (u16, hyper::HeaderMap, Bytes) {
        let resp = handle_request(req, Arc::clone(state), PEER).await.unwrap();
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, headers, body)
    }

    fn get(uri: &str) -> Request<Full<Bytes>> {
        Request::builder().uri(uri).body(Full::new(Bytes::new())).unwrap()
    }

    #[tokio::test]
    async fn test_cached_content_and_revalidation() {
        let state = test_state();
        let (status, headers, body) = send(get("/app.js"), &state).await;
        assert_eq!(status, 200);
        assert_eq!(body, "run();");
        assert_eq!(headers["content-type"], "application/x-javascript; charset=UTF-8");
        assert_eq!(headers["server"], "webtools/0.1");

        let req = Request::builder()
            .uri("/app.js")
            .header("If-None-Match", headers["etag"].clone())
            .body(Full::new(Bytes::new()))
            .unwrap();
        let (status, _, body) = send(req, &state).await;
        assert_eq!(status, 304);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_head_keeps_headers_drops_body() {
        let state = test_state();
        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/app.js")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let (status, headers, body) = send(req, &state).await;
        assert_eq!(status, 200);
        assert!(headers.contains_key("etag"));
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_not_found_and_filters() {
        let state = test_state();
        assert_eq!(send(get("/missing.css"), &state).await.0, 404);

        let req = Request::builder()
            .method(Method::DELETE)
            .uri("/app.js")
            .body(Full::new(Bytes::new()))
            .unwrap();
        assert_eq!(send(req, &state).await.0, 405);

        let req = Request::builder()
            .method(Method::POST)
            .uri("/app.js")
            .body(Full::new(Bytes::from("x")))
            .unwrap();
        assert_eq!(send(req, &state).await.0, 405);

        let req = Request::builder()
            .method(Method::POST)
            .uri(ECHO_PATH)
            .header("content-length", "1000")
            .body(Full::new(Bytes::new()))
            .unwrap();
        assert_eq!(send(req, &state).await.0, 413);
    }

    #[tokio::test]
    async fn test_echo_post_over_limit_without_content_length() {
        let state = test_state();
        let req = Request::builder()
            .method(Method::POST)
            .uri(ECHO_PATH)
            .body(Full::new(Bytes::from("x".repeat(100_000))))
            .unwrap();
        let (status, _, body) = send(req, &state).await;
        assert_eq!(status, 413);
        assert_eq!(body, "413 Payload Too Large");
    }

    #[tokio::test]
    async fn test_echo_post() {
        let state = test_state();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/_echo?a=1")
            .header("Host", "localhost:8080")
            .body(Full::new(Bytes::from("line1\nline2")))
            .unwrap();
        let (status, _, body) = send(req, &state).await;
        assert_eq!(status, 200);

        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["body"], "line1line2");
        assert_eq!(value["params"]["a"], "1");
        assert_eq!(value["client_ip"], "127.0.0.1");
    }

    #[test]
    fn test_teardown_clears_registry() {
        let state = test_state();
        assert_eq!(state.filters.names(), ["body_size", "method"]);
        state.teardown();
        assert!(state.filters.is_empty());
    }
}
