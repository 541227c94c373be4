//! Conditional response module
//!
//! Emits cached text content with `ETag`/`Last-Modified` validators, answering
//! 304 Not Modified when the client already holds the current version.

use chrono::{DateTime, Utc};
use std::io;

use super::exchange::{RequestView, ResponseSink};
use super::{cache, mime};
use super::{CONTENT_TYPE, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};

/// Text content served for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedContent {
    pub content: String,
    /// Empty means no charset qualifier on the Content-Type
    pub charset: String,
    /// `None` means "now"
    pub last_modified: Option<DateTime<Utc>>,
}

impl CachedContent {
    pub fn new(content: impl Into<String>, charset: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            charset: charset.into(),
            last_modified: None,
        }
    }

    #[must_use]
    pub const fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }
}

/// Emit `content` for `request`, or a 304 when `If-None-Match` carries the current `ETag`
///
/// Returns `Ok(false)` without touching the response when there is no request
/// or the content is blank. The `ETag` header is set on both paths. On the
/// full path the body is written before `Last-Modified` is set.
///
/// # Errors
/// Body write failures are returned as is.
pub fn emit<Req, Resp>(
    request: Option<&Req>,
    response: &mut Resp,
    content: &str,
    charset: &str,
    last_modified: Option<DateTime<Utc>>,
) -> io::Result<bool>
where
    Req: RequestView + ?Sized,
    Resp: ResponseSink + ?Sized,
{
    let Some(request) = request else {
        return Ok(false);
    };
    if content.trim().is_empty() {
        return Ok(false);
    }

    let last_modified = last_modified.unwrap_or_else(Utc::now);
    let uri = request.request_uri();

    let etag = cache::generate_etag(uri, last_modified);
    response.set_header(ETAG, &etag);

    if cache::etag_matches(request.header(IF_NONE_MATCH), &etag) {
        response.set_status(304);
        if let Some(since) = request.header(IF_MODIFIED_SINCE) {
            response.set_header(LAST_MODIFIED, since);
        }
        return Ok(true);
    }

    if let Some(content_type) = mime::text_content_type(uri) {
        response.add_header(CONTENT_TYPE, &mime::with_charset(content_type, charset));
    }

    response.write(content)?;
    response.set_date_header(LAST_MODIFIED, last_modified);

    Ok(true)
}

/// [`emit`] for a [`CachedContent`]
pub fn emit_cached<Req, Resp>(
    request: Option<&Req>,
    response: &mut Resp,
    cached: &CachedContent,
) -> io::Result<bool>
where
    Req: RequestView + ?Sized,
    Resp: ResponseSink + ?Sized,
{
    emit(
        request,
        response,
        &cached.content,
        &cached.charset,
        cached.last_modified,
    )
}
