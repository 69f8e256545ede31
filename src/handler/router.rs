//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, path resolution,
//! response building, common headers and access logging.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
///
/// Generic over the request body since no handled method reads one.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let path = req.uri().path();
    let is_head = *req.method() == Method::HEAD;

    let mut response = match check_http_method(req.method()) {
        Some(resp) => resp,
        None => match routing::resolve(&state.config, state.root(), path) {
            Ok(target) => static_files::serve_target(&target, is_head).await,
            Err(err) => static_files::error_response(&err.into(), is_head),
        },
    };

    http::apply_common_headers(&mut response, state.common_headers());

    if state.config.logging.access_log {
        let entry = build_access_entry(&req, &response, remote_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Return an early response for anything other than GET/HEAD
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

fn build_access_entry<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    remote_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        remote_addr.to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, HeaderOverride, PageAlias};
    use http_body_util::BodyExt;
    use tempfile::TempDir;

    const APK_BYTES: &[u8] = b"PK\x03\x04 arm64 build";

    struct TestServer {
        _dir: TempDir,
        state: Arc<AppState>,
    }

    impl TestServer {
        fn new(files: &[(&str, &[u8])], tweak: impl FnOnce(&mut Config)) -> Self {
            let dir = tempfile::tempdir().unwrap();
            for (name, contents) in files {
                let path = dir.path().join(name);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).unwrap();
                }
                std::fs::write(path, contents).unwrap();
            }

            let mut config = Config::load_from("no-such-config-for-router-tests").unwrap();
            config.site.root = dir.path().display().to_string();
            config.site.landing_page = "download.html".to_string();
            config.package.candidates =
                vec!["app-x86.apk".to_string(), "app-arm64.apk".to_string()];
            config.logging.access_log = false;
            tweak(&mut config);

            Self {
                _dir: dir,
                state: Arc::new(AppState::new(config).unwrap()),
            }
        }

        async fn send(&self, method: Method, path: &str) -> (Response<Full<Bytes>>, Bytes) {
            let req = Request::builder()
                .method(method)
                .uri(path)
                .body(())
                .unwrap();
            let remote: SocketAddr = "192.168.1.50:40000".parse().unwrap();
            let response = handle_request(req, Arc::clone(&self.state), remote)
                .await
                .unwrap();
            let (parts, body) = response.into_parts();
            let bytes = body.collect().await.unwrap().to_bytes();
            (Response::from_parts(parts, Full::new(bytes.clone())), bytes)
        }

        async fn get(&self, path: &str) -> (Response<Full<Bytes>>, Bytes) {
            self.send(Method::GET, path).await
        }
    }

    fn default_site() -> Vec<(&'static str, &'static [u8])> {
        vec![
            ("download.html", b"<html>download</html>".as_slice()),
            ("app-arm64.apk", APK_BYTES),
        ]
    }

    #[tokio::test]
    async fn test_package_served_from_fallback_candidate() {
        let server = TestServer::new(&default_site(), |_| {});
        let (response, body) = server.get("/app-release.apk").await;

        assert_eq!(response.status(), 200);
        assert_eq!(body.as_ref(), APK_BYTES);
        let headers = response.headers();
        assert_eq!(headers["content-type"], "application/vnd.android.package-archive");
        assert_eq!(headers["content-length"], APK_BYTES.len().to_string().as_str());
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert!(!headers.contains_key("content-disposition"));
    }

    #[tokio::test]
    async fn test_package_not_yet_built() {
        let server = TestServer::new(&[("download.html", b"<html></html>".as_slice())], |_| {});
        let (response, body) = server.get("/app-release.apk").await;

        assert_eq!(response.status(), 404);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("still building"));
        assert_ne!(text, "404 Not Found");
    }

    #[tokio::test]
    async fn test_root_serves_landing_page() {
        let server = TestServer::new(&default_site(), |_| {});
        let (response, body) = server.get("/").await;
        assert_eq!(response.status(), 200);
        assert_eq!(body.as_ref(), b"<html>download</html>");
        assert_eq!(response.headers()["content-type"], "text/html; charset=utf-8");
    }

    #[tokio::test]
    async fn test_query_string_is_ignored_for_routing() {
        let server = TestServer::new(&default_site(), |_| {});
        let (response, body) = server.get("/?from=qr").await;
        assert_eq!(response.status(), 200);
        assert_eq!(body.as_ref(), b"<html>download</html>");
    }

    #[tokio::test]
    async fn test_nonexistent_path_is_default_404() {
        let server = TestServer::new(&default_site(), |_| {});
        let (response, body) = server.get("/nonexistent.txt").await;
        assert_eq!(response.status(), 404);
        assert_eq!(body.as_ref(), b"404 Not Found");
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_traversal_does_not_escape_root() {
        let server = TestServer::new(&default_site(), |_| {});
        for path in ["/../secret", "/%2e%2e/%2e%2e/etc/passwd", "/a/../../etc/hostname"] {
            let (response, _) = server.get(path).await;
            assert_eq!(response.status(), 404, "{path}");
        }
    }

    #[tokio::test]
    async fn test_page_alias_and_static_files() {
        let mut files = default_site();
        files.push(("download-old.html", b"<html>old</html>".as_slice()));
        files.push(("img/phone.png", b"\x89PNG".as_slice()));
        let server = TestServer::new(&files, |config| {
            config.site.pages = vec![PageAlias {
                path: "/old".to_string(),
                file: "download-old.html".to_string(),
            }];
        });

        let (old, old_body) = server.get("/old").await;
        assert_eq!(old.status(), 200);
        assert_eq!(old_body.as_ref(), b"<html>old</html>");

        let (png, png_body) = server.get("/img/phone.png").await;
        assert_eq!(png.status(), 200);
        assert_eq!(png.headers()["content-type"], "image/png");
        assert_eq!(png_body.as_ref(), b"\x89PNG");
    }

    #[tokio::test]
    async fn test_overrides_on_every_response() {
        let server = TestServer::new(&default_site(), |config| {
            config.package.download_filename = Some("HFC-App-v1.10.1.apk".to_string());
            config.http.headers = vec![HeaderOverride {
                name: "Cache-Control".to_string(),
                value: "no-store, no-cache, must-revalidate".to_string(),
            }];
        });

        let (package, _) = server.get("/app-release.apk").await;
        assert_eq!(
            package.headers()["content-disposition"],
            "attachment; filename=\"HFC-App-v1.10.1.apk\""
        );

        for path in ["/", "/app-release.apk", "/missing"] {
            let (response, _) = server.get(path).await;
            assert_eq!(
                response.headers()["cache-control"],
                "no-store, no-cache, must-revalidate",
                "{path}"
            );
            assert_eq!(response.headers()["access-control-allow-origin"], "*");
        }
    }

    #[tokio::test]
    async fn test_head_returns_headers_only() {
        let server = TestServer::new(&default_site(), |_| {});
        let (response, body) = server.send(Method::HEAD, "/app-release.apk").await;
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()["content-length"],
            APK_BYTES.len().to_string().as_str()
        );
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_options_and_disallowed_methods() {
        let server = TestServer::new(&default_site(), |_| {});

        let (preflight, _) = server.send(Method::OPTIONS, "/app-release.apk").await;
        assert_eq!(preflight.status(), 204);
        assert_eq!(preflight.headers()["access-control-allow-origin"], "*");

        let (post, _) = server.send(Method::POST, "/").await;
        assert_eq!(post.status(), 405);
        assert_eq!(post.headers()["access-control-allow-origin"], "*");
    }

    #[test]
    fn test_access_entry_fields() {
        let req = Request::builder()
            .method(Method::GET)
            .uri("/app-release.apk?src=qr")
            .header("user-agent", "Android")
            .body(())
            .unwrap();
        let response =
            http::build_file_response(Bytes::from_static(b"12345"), "text/plain", false);
        let entry = build_access_entry(
            &req,
            &response,
            "10.0.0.7:5555".parse().unwrap(),
            Instant::now(),
        );

        assert_eq!(entry.remote_addr, "10.0.0.7:5555");
        assert_eq!(entry.path, "/app-release.apk");
        assert_eq!(entry.query.as_deref(), Some("src=qr"));
        assert_eq!(entry.status, 200);
        assert_eq!(entry.body_bytes, 5);
        assert_eq!(entry.user_agent.as_deref(), Some("Android"));
        assert_eq!(entry.referer, None);
    }
}
