//! Raw request body module

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use std::error::Error;
use std::fmt::{self, Display};

use crate::logger;

/// The request body exceeded the byte limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyTooLarge {
    pub limit: usize,
}

impl Display for BodyTooLarge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request body exceeds {} bytes", self.limit)
    }
}

impl Error for BodyTooLarge {}

/// Read a non key-value request body as text, joining lines without terminators
///
/// Read and UTF-8 errors are logged; whatever was decoded up to that point is returned.
pub async fn raw_post_data<B>(body: B) -> String
where
    B: Body,
    B::Error: Display,
{
    match body.collect().await {
        Ok(collected) => decode_lines(&collected.to_bytes()),
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            String::new()
        }
    }
}

/// [`raw_post_data`] that stops reading once `limit` bytes have arrived
///
/// The limit applies to the bytes actually received, whatever the
/// Content-Length header claims.
pub async fn raw_post_data_limited<B>(body: B, limit: usize) -> Result<String, BodyTooLarge>
where
    B: Body,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(decode_lines(&collected.to_bytes())),
        Err(e) if e.is::<LengthLimitError>() => Err(BodyTooLarge { limit }),
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Ok(String::new())
        }
    }
}

fn decode_lines(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => join_lines(text),
        Err(e) => {
            logger::log_warning(&format!("Request body is not valid UTF-8: {e}"));
            let valid = &bytes[..e.valid_up_to()];
            join_lines(&String::from_utf8_lossy(valid))
        }
    }
}

fn join_lines(text: &str) -> String {
    text.lines().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::{Empty, Full};
    use hyper::body::Bytes;

    #[tokio::test]
    async fn test_joins_lines() {
        let body = Full::new(Bytes::from("{\"a\":1,\n\"b\":2}\r\n"));
        assert_eq!(raw_post_data(body).await, "{\"a\":1,\"b\":2}");
    }

    #[tokio::test]
    async fn test_empty_body() {
        assert_eq!(raw_post_data(Empty::<Bytes>::new()).await, "");
    }

    #[tokio::test]
    async fn test_invalid_utf8_keeps_prefix() {
        let body = Full::new(Bytes::from_static(b"ok\nfine\xFFrest"));
        assert_eq!(raw_post_data(body).await, "okfine");
    }

    #[tokio::test]
    async fn test_limited_within_limit() {
        let body = Full::new(Bytes::from("a\nb"));
        assert_eq!(raw_post_data_limited(body, 3).await, Ok("ab".to_string()));
    }

    #[tokio::test]
    async fn test_limited_rejects_oversize_body() {
        let body = Full::new(Bytes::from("x".repeat(100)));
        assert_eq!(
            raw_post_data_limited(body, 64).await,
            Err(BodyTooLarge { limit: 64 })
        );
    }
}
