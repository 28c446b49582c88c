//! Translation from the shared error taxonomy to an HTTP response.
//!
//! The API never panics on a missing evidence file — empty arrays are the
//! contract for that case (the reader already returns `Vec::new()`). This
//! type only covers the genuine failure paths: an absent run, a bad
//! request parameter, or a filesystem error against the run directory.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use qaagent_common::error::Error as CoreError;
use serde::Serialize;

pub struct ApiError(CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorBody { detail: self.0.message })).into_response()
    }
}
