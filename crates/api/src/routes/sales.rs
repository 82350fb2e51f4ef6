//! Sale submission endpoint.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::Method;
use document_store::DocumentStore;
use domain::{RecordedTransaction, SALE_SUBMISSION_METHOD, SaleRequest};
use sale_commit::SaleCoordinator;
use serde::Serialize;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: DocumentStore> {
    pub coordinator: SaleCoordinator<S>,
}

/// Success body: `{ "ok": true, "data": <transaction> }`.
#[derive(Debug, Serialize)]
pub struct SaleResponse {
    pub ok: bool,
    pub data: RecordedTransaction,
}

/// ANY /sales — commits a sale.
///
/// Every method is routed here so that the commit pipeline, not the
/// router, decides which method is accepted. The body is only parsed for
/// the submission method.
#[tracing::instrument(skip_all, fields(method = %method))]
pub async fn submit<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    method: Method,
    body: Bytes,
) -> Result<Json<SaleResponse>, ApiError> {
    let request = if method.as_str().eq_ignore_ascii_case(SALE_SUBMISSION_METHOD) {
        parse_request(&body)?
    } else {
        SaleRequest::default()
    };

    let outcome = state.coordinator.submit(method.as_str(), request).await?;

    Ok(Json(SaleResponse {
        ok: true,
        data: outcome.transaction,
    }))
}

fn parse_request(body: &[u8]) -> Result<SaleRequest, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "unreadable sale payload");
        ApiError::MalformedBody(e.to_string())
    })
}
