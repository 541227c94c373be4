//! Cached content module
//!
//! Loads configured text files at startup and serves them through the
//! conditional emitter.

use chrono::{DateTime, Utc};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

use crate::http::{self, BufferedResponse, CachedContent, RequestView};
use crate::logger;

/// Request path -> cached text resource
#[derive(Debug, Default)]
pub struct ContentStore {
    entries: HashMap<String, CachedContent>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every configured file; unreadable files are logged and skipped
    pub async fn load(files: &HashMap<String, String>, charset: &str) -> Self {
        let mut store = Self::new();
        for (uri, path) in files {
            match load_file(Path::new(path), charset).await {
                Ok(cached) => {
                    logger::log_debug(&format!("Cached {uri} from {path}"));
                    store.insert(uri.clone(), cached);
                }
                Err(e) => logger::log_warning(&format!("Skipping {uri}: cannot load '{path}': {e}")),
            }
        }
        store
    }

    pub fn insert(&mut self, uri: impl Into<String>, cached: CachedContent) {
        self.entries.insert(uri.into(), cached);
    }

    pub fn get(&self, uri: &str) -> Option<&CachedContent> {
        self.entries.get(uri)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

async fn load_file(path: &Path, charset: &str) -> std::io::Result<CachedContent> {
    let content = fs::read_to_string(path).await?;
    let modified = fs::metadata(path).await?.modified()?;
    Ok(CachedContent::new(content, charset).with_last_modified(DateTime::<Utc>::from(modified)))
}

/// Serve a cached resource, `None` when the path is not cached
///
/// Blank content is answered with 404, a failed body write with 500.
pub fn serve_cached<R>(store: &ContentStore, request: &R) -> Option<Response<Full<Bytes>>>
where
    R: RequestView + ?Sized,
{
    let cached = store.get(request.request_uri())?;
    let mut response = BufferedResponse::new();

    let resp = match http::emit_cached(Some(request), &mut response, cached) {
        Ok(true) => response.into_response(),
        Ok(false) => http::build_404_response(),
        Err(e) => {
            logger::log_error(&format!("Failed to write {}: {e}", request.request_uri()));
            http::build_500_response()
        }
    };
    Some(resp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hyper::Request;

    fn store() -> ContentStore {
        let when = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut store = ContentStore::new();
        store.insert("/app.js", CachedContent::new("run();", "UTF-8").with_last_modified(when));
        store.insert("/empty.css", CachedContent::new("  ", "UTF-8").with_last_modified(when));
        store
    }

    #[test]
    fn test_serve_and_revalidate() {
        let store = store();
        let req = Request::builder().uri("/app.js").body(()).unwrap();
        let resp = serve_cached(&store, &req).unwrap();
        assert_eq!(resp.status(), 200);
        let etag = resp.headers().get("etag").unwrap().to_str().unwrap().to_string();

        let req = Request::builder()
            .uri("/app.js?v=2")
            .header("If-None-Match", etag)
            .body(())
            .unwrap();
        let resp = serve_cached(&store, &req).unwrap();
        assert_eq!(resp.status(), 304);
    }

    #[test]
    fn test_unknown_and_blank() {
        let store = store();
        let req = Request::builder().uri("/nope.js").body(()).unwrap();
        assert!(serve_cached(&store, &req).is_none());

        let req = Request::builder().uri("/empty.css").body(()).unwrap();
        assert_eq!(serve_cached(&store, &req).unwrap().status(), 404);
    }

    #[tokio::test]
    async fn test_load_skips_missing_files() {
        let dir = std::env::temp_dir().join(format!("webtools-content-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let css = dir.join("site.css");
        std::fs::write(&css, "body{}").unwrap();

        let files = HashMap::from([
            ("/site.css".to_string(), css.to_str().unwrap().to_string()),
            ("/gone.js".to_string(), dir.join("gone.js").to_str().unwrap().to_string()),
        ]);
        let store = ContentStore::load(&files, "UTF-8").await;

        assert_eq!(store.len(), 1);
        let cached = store.get("/site.css").unwrap();
        assert_eq!(cached.content, "body{}");
        assert!(cached.last_modified.is_some());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
