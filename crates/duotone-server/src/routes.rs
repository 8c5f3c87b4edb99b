//! Request dispatch.

use std::net::IpAddr;
use std::time::Instant;

use http::header::{CACHE_CONTROL, CONTENT_TYPE};
use http::{HeaderValue, Method, StatusCode};

use crate::config::ServerConfig;
use crate::cors::CorsPolicy;
use crate::error::ServerError;
use crate::multipart;
use crate::process::ProcessJob;
use crate::rate_limit::RateLimiter;
use crate::static_files::StaticFiles;
use crate::wire::{Request, Response, bytes_response, json_response};

/// Shared state for every connection.
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub cors: CorsPolicy,
    pub limiter: RateLimiter,
    pub static_files: StaticFiles,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            cors: CorsPolicy::new(config.allowed_origins.clone()),
            limiter: RateLimiter::new(config.rate_limit_max, config.rate_limit_window),
            static_files: StaticFiles::new(config.static_dir.clone(), config.max_upload_mb),
            config,
        }
    }
}

/// Produce the response for `request` from `peer`.
///
/// CORS runs first, then the rate limiter, then routing. Errors never
/// escape: they become JSON error responses.
pub async fn handle(state: &AppState, request: Request, peer: IpAddr) -> Response {
    let allow_origin = match state.cors.check(request.headers()) {
        Ok(origin) => origin,
        Err(err) => {
            tracing::warn!("{peer} {} {}: {err}", request.method(), request.uri().path());
            return err.to_response();
        }
    };

    let decision = state.limiter.check(peer, Instant::now());
    let mut response = if decision.allowed {
        let method = request.method().clone();
        let path = request.uri().path().to_owned();
        match route(state, request).await {
            Ok(response) => response,
            Err(err) => {
                if err.status().is_server_error() {
                    tracing::error!("{peer} {method} {path}: {err}");
                } else {
                    tracing::debug!("{peer} {method} {path}: {err}");
                }
                err.to_response()
            }
        }
    } else {
        tracing::warn!("{peer} rate limited");
        ServerError::RateLimited {
            retry_after_secs: decision.reset_after.as_secs().max(1),
        }
        .to_response()
    };

    decision.decorate(&mut response);
    CorsPolicy::decorate(&mut response, allow_origin);
    response
}

async fn route(state: &AppState, request: Request) -> Result<Response, ServerError> {
    match (request.method(), request.uri().path()) {
        (&Method::OPTIONS, _) => Ok(CorsPolicy::preflight(request.headers())),
        (&Method::POST, "/api/process") => process(state, request).await,
        (&Method::GET | &Method::HEAD, "/health") => {
            Ok(json_response(StatusCode::OK, &serde_json::json!({ "ok": true })))
        }
        (_, "/api/process" | "/health") => Err(ServerError::MethodNotAllowed),
        (&Method::GET | &Method::HEAD, path) => state.static_files.serve(path).await,
        _ => Err(ServerError::NotFound),
    }
}

async fn process(state: &AppState, request: Request) -> Result<Response, ServerError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    let max_upload = state.config.max_upload_bytes();

    let output = tokio::task::spawn_blocking(move || {
        let form = multipart::parse(&content_type, request.body())?;
        ProcessJob::from_form(form, max_upload)?.run()
    })
    .await??;

    let mut response = bytes_response(StatusCode::OK, output.format.mime(), output.bytes);
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok(response)
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    const PEER: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    fn state(config: ServerConfig) -> AppState {
        AppState::new(config)
    }

    fn request(method: Method, path: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(path)
            .body(Vec::new())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let state = state(ServerConfig::default());
        let response = handle(&state, request(Method::GET, "/health"), PEER).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, serde_json::json!({ "ok": true }));
        assert_eq!(response.headers()["ratelimit-limit"], "200");
        assert_eq!(response.headers()["ratelimit-remaining"], "199");
    }

    #[tokio::test]
    async fn test_wrong_method_on_api() {
        let state = state(ServerConfig::default());
        let response = handle(&state, request(Method::GET, "/api/process"), PEER).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let response = handle(&state, request(Method::DELETE, "/anything"), PEER).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_rejection_and_echo() {
        let state = state(ServerConfig {
            allowed_origins: vec!["https://ok.example".into()],
            ..ServerConfig::default()
        });

        let mut bad = request(Method::GET, "/health");
        bad.headers_mut()
            .insert(http::header::ORIGIN, HeaderValue::from_static("https://bad.example"));
        let response = handle(&state, bad, PEER).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let mut good = request(Method::GET, "/health");
        good.headers_mut()
            .insert(http::header::ORIGIN, HeaderValue::from_static("https://ok.example"));
        let response = handle(&state, good, PEER).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[http::header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://ok.example"
        );
    }

    #[tokio::test]
    async fn test_rate_limit_kicks_in() {
        let state = state(ServerConfig {
            rate_limit_max: 2,
            ..ServerConfig::default()
        });
        for _ in 0..2 {
            let response = handle(&state, request(Method::GET, "/health"), PEER).await;
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = handle(&state, request(Method::GET, "/health"), PEER).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(http::header::RETRY_AFTER));
        assert_eq!(response.headers()["ratelimit-remaining"], "0");
    }

    #[tokio::test]
    async fn test_process_without_multipart_is_bad_request() {
        let state = state(ServerConfig::default());
        let mut req = request(Method::POST, "/api/process");
        req.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let response = handle(&state, req, PEER).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_options_preflight() {
        let state = state(ServerConfig::default());
        let response = handle(&state, request(Method::OPTIONS, "/api/process"), PEER).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
