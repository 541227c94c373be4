//! HTTP cache validation module
//!
//! Provides `ETag` generation from (URI, last-modified) and HTTP date formatting.

use chrono::{DateTime, Utc};

/// Timestamp layout mixed into the `ETag` key
const ETAG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// IMF-fixdate layout used by `Last-Modified`
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// 32-bit polynomial string hash (`h = 31 * h + unit` over UTF-16 units)
///
/// Stable across processes and releases, unlike `DefaultHasher`.
pub fn string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Format a timestamp the way it is mixed into the `ETag` key
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.format(ETAG_TIME_FORMAT).to_string()
}

/// Format a timestamp as an HTTP date
pub fn format_http_date(time: DateTime<Utc>) -> String {
    time.format(HTTP_DATE_FORMAT).to_string()
}

/// Generate the `ETag` for a resource version
///
/// The key is `<uri>@<timestamp>`; the token is `"0<hash>"` including the quotes.
/// Timestamps are truncated to whole seconds.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use webtools::http::cache::generate_etag;
///
/// let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let etag = generate_etag("/app.js", t);
/// assert!(etag.starts_with("\"0"));
/// assert_eq!(etag, generate_etag("/app.js", t));
/// ```
pub fn generate_etag(uri: &str, last_modified: DateTime<Utc>) -> String {
    let key = format!("{uri}@{}", format_timestamp(last_modified));
    format!("\"0{}\"", string_hash(&key))
}

/// Check the client's `If-None-Match` against the server `ETag`
///
/// Exact string comparison only: lists and `*` do not match.
pub fn etag_matches(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match == Some(etag)
}
