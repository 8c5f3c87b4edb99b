//! Static frontend assets.

use std::path::{Component, Path, PathBuf};

use http::header::CACHE_CONTROL;
use http::{HeaderValue, StatusCode};

use crate::embedded_ui;
use crate::error::ServerError;
use crate::wire::{Response, bytes_response};

/// Serves files under a root directory with `Cache-Control: no-store`.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    max_upload_mb: u64,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>, max_upload_mb: u64) -> Self {
        Self {
            root: root.into(),
            max_upload_mb,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a request path to a file under the root.
    ///
    /// Percent-escapes are decoded first; any `..`, absolute or prefixed
    /// component is rejected.
    pub fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let decoded = urlencoding::decode(request_path).ok()?;
        let relative = decoded.trim_start_matches('/');
        let relative = if relative.is_empty() || relative.ends_with('/') {
            format!("{relative}index.html")
        } else {
            relative.to_owned()
        };

        let mut path = self.root.clone();
        for component in Path::new(&relative).components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Some(path)
    }

    /// Response for a `GET` of `request_path`.
    pub async fn serve(&self, request_path: &str) -> Result<Response, ServerError> {
        let path = self.resolve(request_path).ok_or(ServerError::NotFound)?;

        let mut response = match tokio::fs::read(&path).await {
            Ok(body) => bytes_response(StatusCode::OK, content_type(&path), body),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && is_root(request_path) => {
                bytes_response(
                    StatusCode::OK,
                    "text/html; charset=utf-8",
                    embedded_ui::placeholder_html(self.max_upload_mb).into_bytes(),
                )
            }
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::IsADirectory
                ) =>
            {
                return Err(ServerError::NotFound);
            }
            Err(err) => return Err(err.into()),
        };
        response
            .headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        Ok(response)
    }
}

fn is_root(request_path: &str) -> bool {
    request_path.is_empty() || request_path == "/" || request_path == "/index.html"
}

/// MIME type by file extension.
pub fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("json" | "map") => "application/json; charset=utf-8",
        Some("wasm") => "application/wasm",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        Some("webmanifest") => "application/manifest+json",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "duotone-static-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_resolve_index_and_nested() {
        let files = StaticFiles::new("/srv/public", 25);
        assert_eq!(files.resolve("/"), Some(PathBuf::from("/srv/public/index.html")));
        assert_eq!(
            files.resolve("/js/app.js"),
            Some(PathBuf::from("/srv/public/js/app.js"))
        );
        assert_eq!(
            files.resolve("/docs/"),
            Some(PathBuf::from("/srv/public/docs/index.html"))
        );
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let files = StaticFiles::new("/srv/public", 25);
        assert_eq!(files.resolve("/../etc/passwd"), None);
        assert_eq!(files.resolve("/a/%2e%2e/%2e%2e/secret"), None);
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type(Path::new("a.wasm")), "application/wasm");
        assert_eq!(content_type(Path::new("A.PNG")), "image/png");
        assert_eq!(content_type(Path::new("noext")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_serves_file_with_no_store() {
        let dir = scratch_dir("serve");
        std::fs::write(dir.join("style.css"), "body{}").unwrap();
        let files = StaticFiles::new(&dir, 25);

        let response = files.serve("/style.css").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CACHE_CONTROL], "no-store");
        assert_eq!(response.body().as_slice(), b"body{}");

        assert!(matches!(
            files.serve("/missing.css").await,
            Err(ServerError::NotFound)
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_placeholder_when_index_missing() {
        let dir = scratch_dir("placeholder");
        let files = StaticFiles::new(&dir, 7);
        let response = files.serve("/").await.unwrap();
        let html = String::from_utf8(response.body().clone()).unwrap();
        assert!(html.contains("7 MB"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
