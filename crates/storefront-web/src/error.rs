//! Error responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storefront_client::{ClientError, ErrorKind, Notice, Operation, PendingDeletion};

/// Failed request, rendered as a status code and a [`Notice`] body
#[derive(Debug)]
pub struct ApiError {
    /// Response status
    pub status: StatusCode,
    /// Response body
    pub notice: Notice,
}

impl ApiError {
    /// Map a client error from `operation` onto a response
    pub fn from_client(operation: Operation, err: &ClientError) -> Self {
        let status = match err.kind() {
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Transport => StatusCode::BAD_GATEWAY,
        };

        Self {
            status,
            notice: Notice::from_error(operation, err),
        }
    }

    /// Delete attempted without confirmation
    pub fn confirmation_required() -> Self {
        Self {
            status: StatusCode::PRECONDITION_REQUIRED,
            notice: Notice::error(PendingDeletion::TITLE, PendingDeletion::TEXT),
        }
    }

    /// Malformed request body
    pub fn bad_request(text: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            notice: Notice::error("Error", text),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.notice)).into_response()
    }
}
