//! Error responses
//!
//! Every failure leaves the API as `{"error": {"code", "message"}}` with a
//! status fixed per error kind.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use roster_core::Error;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

/// Wrapper to make service errors usable as axum error responses
#[derive(Debug)]
pub enum ApiErr {
    /// Outcome reported by the review service
    Service(Error),
    /// Body or query string that could not be decoded
    InvalidRequest(String),
}

impl ApiErr {
    /// HTTP status and machine-readable code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiErr::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ApiErr::Service(err) => {
                let status = match err {
                    Error::NotFound(_) => StatusCode::NOT_FOUND,
                    Error::TeamExists(_) => StatusCode::BAD_REQUEST,
                    Error::PrExists(_)
                    | Error::PrMerged(_)
                    | Error::NotAssigned { .. }
                    | Error::NoCandidate(_)
                    | Error::Conflict(_) => StatusCode::CONFLICT,
                    Error::Io(_) | Error::Config(_) | Error::Internal(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, err.code())
            }
        }
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            ApiErr::Service(err) if !err.is_business() => {
                tracing::error!(error = %err, "Request failed");
                "internal error".to_string()
            }
            ApiErr::Service(err) => err.to_string(),
            ApiErr::InvalidRequest(reason) => reason.clone(),
        };

        (
            status,
            Json(ErrorEnvelope {
                error: ErrorBody { code, message },
            }),
        )
            .into_response()
    }
}

impl From<Error> for ApiErr {
    fn from(err: Error) -> Self {
        Self::Service(err)
    }
}

impl From<JsonRejection> for ApiErr {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiErr {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}
