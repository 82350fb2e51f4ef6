//! API error types with HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sale_commit::SaleError;
use serde::Serialize;

/// Failure body: `{ "ok": false, "msg": "..." }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub msg: String,
}

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// The request body is not a readable sale payload.
    MalformedBody(String),
    /// The commit pipeline rejected or failed the sale.
    Sale(SaleError),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Sale(err) => match err {
                SaleError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
                SaleError::InvalidRequest(_) | SaleError::InactiveShift => StatusCode::BAD_REQUEST,
                SaleError::InsufficientStock { .. } | SaleError::StockContention { .. } => {
                    StatusCode::CONFLICT
                }
                SaleError::Store(_) | SaleError::Unexpected(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::MalformedBody(reason) => format!("Invalid transaction data: {reason}"),
            ApiError::Sale(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = self.message();
        if status.is_server_error() {
            tracing::error!(error = %msg, "internal server error");
        }

        (status, Json(ErrorBody { ok: false, msg })).into_response()
    }
}

impl From<SaleError> for ApiError {
    fn from(err: SaleError) -> Self {
        ApiError::Sale(err)
    }
}
