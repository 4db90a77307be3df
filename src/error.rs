//! Error type shared by the HTTP handlers, the Spotify client and the
//! aggregation pipeline.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request to Spotify failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("token endpoint answered with status {status}")]
    TokenExchange { status: u16 },

    #[error("access token rejected by Spotify")]
    Unauthorized,

    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("missing query parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("invalid value `{value}` for query parameter `{name}`")]
    InvalidParameter { name: &'static str, value: String },
}

impl Error {
    /// Short machine-readable code placed in the `error` field of the body.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) | Error::Io(_) | Error::Json(_) => "internal",
            Error::Http(_) => "upstream_unreachable",
            Error::TokenExchange { .. } => "invalid_token",
            Error::Unauthorized => "unauthorized",
            Error::UnexpectedStatus { .. } => "upstream_status",
            Error::MissingParameter(_) => "missing_parameter",
            Error::InvalidParameter { .. } => "invalid_parameter",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Config(_) | Error::Io(_) | Error::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Http(_) | Error::TokenExchange { .. } | Error::UnexpectedStatus { .. } => {
                StatusCode::BAD_GATEWAY
            }
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::MissingParameter(_) | Error::InvalidParameter { .. } => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}
