//! Content-Type module
//!
//! Infers the Content-Type of cached text resources from the request URI and
//! writes Content-Type headers with an optional charset.

use super::exchange::ResponseSink;
use super::CONTENT_TYPE;

/// Content-Type of a cached text resource, by URI suffix
///
/// Only scripts, stylesheets and HTML pages are recognized; a URI ending in `/`
/// is an HTML directory index.
///
/// # Examples
/// ```
/// use webtools::http::mime::text_content_type;
/// assert_eq!(text_content_type("/app.js"), Some("application/x-javascript"));
/// assert_eq!(text_content_type("/docs/"), Some("text/html"));
/// assert_eq!(text_content_type("/data.json"), None);
/// ```
pub fn text_content_type(uri: &str) -> Option<&'static str> {
    if uri.ends_with(".js") {
        Some("application/x-javascript")
    } else if uri.ends_with(".css") {
        Some("text/css")
    } else if uri.ends_with(".htm") || uri.ends_with(".html") || uri.ends_with('/') {
        Some("text/html")
    } else {
        None
    }
}

/// `<type>; charset=<charset>`, or the bare type when the charset is empty
pub fn with_charset(content_type: &str, charset: &str) -> String {
    if charset.is_empty() {
        content_type.to_string()
    } else {
        format!("{content_type}; charset={charset}")
    }
}

/// Add a Content-Type header, qualified as `;charset=<charset>` when one is given
pub fn add_content_type<S>(response: &mut S, content_type: &str, charset: Option<&str>)
where
    S: ResponseSink + ?Sized,
{
    match charset.filter(|c| !c.is_empty()) {
        Some(cs) => response.add_header(CONTENT_TYPE, &format!("{content_type};charset={cs}")),
        None => response.add_header(CONTENT_TYPE, content_type),
    }
}

/// Add `Content-Type: application/json`
pub fn add_json_content_type<S>(response: &mut S, charset: Option<&str>)
where
    S: ResponseSink + ?Sized,
{
    add_content_type(response, "application/json", charset);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::BufferedResponse;

    #[test]
    fn test_text_types() {
        assert_eq!(text_content_type("/app.js"), Some("application/x-javascript"));
        assert_eq!(text_content_type("/site.css"), Some("text/css"));
        assert_eq!(text_content_type("/index.htm"), Some("text/html"));
        assert_eq!(text_content_type("/index.html"), Some("text/html"));
        assert_eq!(text_content_type("/"), Some("text/html"));
    }

    #[test]
    fn test_unknown_suffix() {
        assert_eq!(text_content_type("/data.json"), None);
        assert_eq!(text_content_type("/logo.png"), None);
        assert_eq!(text_content_type("/app.jsx"), None);
        assert_eq!(text_content_type(""), None);
    }

    #[test]
    fn test_with_charset() {
        assert_eq!(with_charset("text/css", "UTF-8"), "text/css; charset=UTF-8");
        assert_eq!(with_charset("text/css", ""), "text/css");
    }

    #[test]
    fn test_add_json_content_type() {
        let mut resp = BufferedResponse::new();
        add_json_content_type(&mut resp, Some("utf-8"));
        assert_eq!(resp.header("Content-Type"), Some("application/json;charset=utf-8"));

        let mut resp = BufferedResponse::new();
        add_json_content_type(&mut resp, Some(""));
        assert_eq!(resp.header("Content-Type"), Some("application/json"));

        let mut resp = BufferedResponse::new();
        add_content_type(&mut resp, "text/plain", None);
        assert_eq!(resp.header("Content-Type"), Some("text/plain"));
    }
}
