//! Request parameter module
//!
//! Typed readers over query parameters and a multi-value parameter map with
//! charset-aware decoding.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::http::RequestView;
use crate::logger;

/// Charset assumed when none is given
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Accepted layouts for date-time parameters, tried in order
const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parameter decoding failure
#[derive(Debug)]
pub enum DecodeError {
    /// Charset name not known to the decoder
    UnsupportedCharset(String),
    /// Percent-decoded bytes are not valid in the charset
    InvalidSequence(std::str::Utf8Error),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedCharset(cs) => write!(f, "unsupported charset '{cs}'"),
            Self::InvalidSequence(e) => write!(f, "invalid byte sequence: {e}"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Split a raw `application/x-www-form-urlencoded` string into `(name, value)` pairs
///
/// Values stay encoded. Empty segments are skipped and a segment without `=`
/// has an empty value.
///
/// # Examples
/// ```
/// use webtools::request::params::query_pairs;
/// assert_eq!(query_pairs("a=1&&b"), vec![("a", "1"), ("b", "")]);
/// ```
pub fn query_pairs(raw: &str) -> Vec<(&str, &str)> {
    raw.split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.split_once('=').unwrap_or((segment, "")))
        .collect()
}

/// Decode one form component (`+` is a space) in the given charset
///
/// Charset names are matched case-insensitively: `UTF-8`/`utf8` and
/// `ISO-8859-1`/`latin1` are supported.
pub fn decode_component(raw: &str, charset: &str) -> Result<String, DecodeError> {
    let spaced = raw.replace('+', " ");
    let bytes = percent_decode_str(&spaced);
    match charset.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => bytes
            .decode_utf8()
            .map(Cow::into_owned)
            .map_err(DecodeError::InvalidSequence),
        "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Ok(bytes.map(char::from).collect()),
        _ => Err(DecodeError::UnsupportedCharset(charset.to_string())),
    }
}

/// Decode as UTF-8, replacing invalid sequences
fn decode_lossy(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// First value of a query parameter, decoded as UTF-8
pub fn parameter<R: RequestView + ?Sized>(request: &R, name: &str) -> Option<String> {
    let query = request.query_string()?;
    query_pairs(query)
        .into_iter()
        .find(|(key, _)| decode_lossy(key) == name)
        .map(|(_, value)| decode_lossy(value))
}

/// Same as [`parameter`]
pub fn get_string<R: RequestView + ?Sized>(request: &R, name: &str) -> Option<String> {
    parameter(request, name)
}

fn parse_or<T, R>(request: &R, name: &str, default: T) -> T
where
    T: FromStr,
    R: RequestView + ?Sized,
{
    parameter(request, name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Integer parameter, `default` when absent or not a number
pub fn get_int<R: RequestView + ?Sized>(request: &R, name: &str, default: i32) -> i32 {
    parse_or(request, name, default)
}

pub fn get_long<R: RequestView + ?Sized>(request: &R, name: &str, default: i64) -> i64 {
    parse_or(request, name, default)
}

pub fn get_float<R: RequestView + ?Sized>(request: &R, name: &str, default: f32) -> f32 {
    parse_or(request, name, default)
}

/// Date-time parameter
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, RFC 3339 (converted to
/// its local wall time) and a bare `YYYY-MM-DD` at midnight.
pub fn get_date_time<R: RequestView + ?Sized>(request: &R, name: &str) -> Option<NaiveDateTime> {
    parse_date_time(parameter(request, name)?.trim())
}

fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_local())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Decode a query string into a name -> value map
///
/// Repeated names are joined with `,` in arrival order. Values are decoded with
/// `charset` (UTF-8 when `None`); when that fails the failure is logged and the
/// raw value is kept. Never fails: an empty query yields an empty map.
///
/// # Examples
/// ```
/// use webtools::request::params::parameter_map;
/// let map = parameter_map("t1=1&t1=2&t2=a%20b", None);
/// assert_eq!(map["t1"], "1,2");
/// assert_eq!(map["t2"], "a b");
/// ```
pub fn parameter_map(raw: &str, charset: Option<&str>) -> BTreeMap<String, String> {
    let charset = charset.unwrap_or(DEFAULT_CHARSET);

    let mut grouped: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for (key, value) in query_pairs(raw) {
        grouped.entry(decode_lossy(key)).or_default().push(value);
    }

    grouped
        .into_iter()
        .map(|(key, values)| {
            let joined = values.join(",");
            let value = match decode_component(&joined, charset) {
                Ok(decoded) => decoded,
                Err(e) => {
                    logger::log_warning(&format!("Failed to decode parameter '{key}': {e}"));
                    joined
                }
            };
            (key, value)
        })
        .collect()
}

/// [`parameter_map`] over the request's query string
pub fn request_parameter_map<R: RequestView + ?Sized>(
    request: &R,
    charset: Option<&str>,
) -> BTreeMap<String, String> {
    request
        .query_string()
        .map(|query| parameter_map(query, charset))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::Request;

    fn get(uri: &str) -> Request<()> {
        Request::builder().uri(uri).body(()).unwrap()
    }

    #[test]
    fn test_query_pairs() {
        assert_eq!(
            query_pairs("a=1&b=&c&=x&&d=e=f"),
            vec![("a", "1"), ("b", ""), ("c", ""), ("", "x"), ("d", "e=f")]
        );
        assert!(query_pairs("").is_empty());
    }

    #[test]
    fn test_parameter_decoding() {
        let req = get("/s?q=hello+world&name=%E4%B8%AD&q=second");
        assert_eq!(parameter(&req, "q").as_deref(), Some("hello world"));
        assert_eq!(get_string(&req, "name").as_deref(), Some("中"));
        assert_eq!(parameter(&req, "missing"), None);
        assert_eq!(parameter(&get("/s"), "q"), None);
    }

    #[test]
    fn test_numeric_parameters() {
        let req = get("/list?page=3&size=%2050&big=9000000000&ratio=0.5&bad=x");
        assert_eq!(get_int(&req, "page", 1), 3);
        assert_eq!(get_int(&req, "size", 10), 50);
        assert_eq!(get_int(&req, "bad", 7), 7);
        assert_eq!(get_int(&req, "big", -1), -1);
        assert_eq!(get_long(&req, "big", -1), 9_000_000_000);
        assert!((get_float(&req, "ratio", 0.0) - 0.5).abs() < f32::EPSILON);
        assert!((get_float(&req, "none", 1.5) - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_date_time_parameter() {
        let req = get("/r?a=2024-03-05%2010:20:30&b=2024-03-05&c=2024-03-05T10:20:30Z&d=yesterday");
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(10, 20, 30)
            .unwrap();
        assert_eq!(get_date_time(&req, "a"), Some(expected));
        assert_eq!(get_date_time(&req, "c"), Some(expected));
        assert_eq!(
            get_date_time(&req, "b"),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(get_date_time(&req, "d"), None);
    }

    #[test]
    fn test_parameter_map_multi_value() {
        let map = parameter_map("t1=1&t2=3&t1=2", None);
        assert_eq!(map.len(), 2);
        assert_eq!(map["t1"], "1,2");
        assert_eq!(map["t2"], "3");
    }

    #[test]
    fn test_parameter_map_charsets() {
        let latin = parameter_map("city=M%FCnchen", Some("ISO-8859-1"));
        assert_eq!(latin["city"], "München");

        let utf8 = parameter_map("city=M%C3%BCnchen", Some("utf-8"));
        assert_eq!(utf8["city"], "München");
    }

    #[test]
    fn test_parameter_map_keeps_raw_on_failure() {
        let invalid = parameter_map("city=M%FCnchen", Some("UTF-8"));
        assert_eq!(invalid["city"], "M%FCnchen");

        let unsupported = parameter_map("x=a%20b", Some("EBCDIC"));
        assert_eq!(unsupported["x"], "a%20b");
    }

    #[test]
    fn test_request_parameter_map() {
        assert!(request_parameter_map(&get("/"), None).is_empty());
        let map = request_parameter_map(&get("/?k=v"), None);
        assert_eq!(map["k"], "v");
    }

    #[test]
    fn test_decode_component_errors() {
        assert!(matches!(
            decode_component("x", "koi8-r"),
            Err(DecodeError::UnsupportedCharset(_))
        ));
        assert!(matches!(
            decode_component("%FF", "UTF-8"),
            Err(DecodeError::InvalidSequence(_))
        ));
    }
}
