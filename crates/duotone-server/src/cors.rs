//! Origin allow-list.

use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_REQUEST_HEADERS, ORIGIN, VARY,
};
use http::{HeaderMap, HeaderValue, StatusCode};

use crate::error::ServerError;
use crate::wire::{Response, empty_response};

const ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

/// Decides which browser origins may call the API.
#[derive(Debug, Clone, Default)]
pub struct CorsPolicy {
    allowed: Vec<String>,
}

impl CorsPolicy {
    /// An empty list allows every origin.
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    /// Check the request's `Origin`.
    ///
    /// Returns the value to echo in `Access-Control-Allow-Origin`, or `None`
    /// for same-origin / non-browser requests that carry no `Origin`.
    pub fn check(&self, headers: &HeaderMap) -> Result<Option<HeaderValue>, ServerError> {
        let Some(origin) = headers.get(ORIGIN) else {
            return Ok(None);
        };
        if self.allowed.is_empty() || self.is_listed(origin) {
            Ok(Some(origin.clone()))
        } else {
            Err(ServerError::CorsRejected)
        }
    }

    fn is_listed(&self, origin: &HeaderValue) -> bool {
        origin
            .to_str()
            .is_ok_and(|o| self.allowed.iter().any(|a| a == o))
    }

    /// Attach CORS headers for an allowed origin.
    pub fn decorate(response: &mut Response, allow_origin: Option<HeaderValue>) {
        if let Some(origin) = allow_origin {
            let headers = response.headers_mut();
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
            headers.append(VARY, HeaderValue::from_static("Origin"));
        }
    }

    /// Response to an `OPTIONS` preflight.
    pub fn preflight(request_headers: &HeaderMap) -> Response {
        let mut response = empty_response(StatusCode::NO_CONTENT);
        let headers = response.headers_mut();
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        if let Some(requested) = request_headers.get(ACCESS_CONTROL_REQUEST_HEADERS) {
            headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
            headers.append(VARY, HeaderValue::from_static("Access-Control-Request-Headers"));
        }
        response
    }
}
