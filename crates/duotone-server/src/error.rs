use http::StatusCode;

use duotone_core::CoreError;

use crate::wire::{Response, json_response};

/// Errors that end a request.
///
/// Every variant except [`ServerError::Io`] and [`ServerError::Closed`]
/// becomes a JSON `{"error": ...}` response.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Request header fields too large")]
    HeadTooLarge,
    #[error("Content-Length required")]
    LengthRequired,
    #[error("File too large")]
    PayloadTooLarge,
    #[error("No image uploaded")]
    NoImage,
    #[error("Only image files are allowed")]
    UnsupportedMedia,
    #[error("Not allowed by CORS")]
    CorsRejected,
    #[error("Too many requests, please try again later.")]
    RateLimited { retry_after_secs: u64 },
    #[error("Not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Request timed out")]
    Timeout,
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("processing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("connection closed before a request arrived")]
    Closed,
}

impl ServerError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::HeadTooLarge => StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE,
            Self::LengthRequired => StatusCode::LENGTH_REQUIRED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NoImage => StatusCode::BAD_REQUEST,
            Self::UnsupportedMedia => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::CorsRejected => StatusCode::FORBIDDEN,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::Core(CoreError::Decode(_)) => StatusCode::BAD_REQUEST,
            Self::Core(_) | Self::Task(_) | Self::Io(_) | Self::Closed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether a response can still be written for this error.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Closed)
    }

    /// JSON error response.
    pub fn to_response(&self) -> Response {
        let mut response = json_response(
            self.status(),
            &serde_json::json!({ "error": self.to_string() }),
        );
        if let Self::RateLimited { retry_after_secs } = self {
            response.headers_mut().insert(
                http::header::RETRY_AFTER,
                http::HeaderValue::from(*retry_after_secs),
            );
        }
        response
    }
}
