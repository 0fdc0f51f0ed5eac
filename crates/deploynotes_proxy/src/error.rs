//! Proxy error taxonomy and HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// Any method other than `POST`.
    MethodNotAllowed,
    /// Body is not JSON or `tips` is missing / not an array.
    BadRequest(String),
    /// The overwrite call failed; `body` is relayed verbatim.
    Upstream { status: Option<u16>, body: String },
}

impl Display for ProxyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MethodNotAllowed => write!(f, "method not allowed"),
            Self::BadRequest(details) => write!(f, "invalid format: {details}"),
            Self::Upstream {
                status: Some(status),
                body,
            } => write!(f, "upstream write failed with HTTP {status}: {body}"),
            Self::Upstream { status: None, body } => write!(f, "upstream write failed: {body}"),
        }
    }
}

impl Error for ProxyError {}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            Self::Upstream { body, .. } => body,
            other => other.to_string(),
        };
        (status, body).into_response()
    }
}
