//! HTTP error responses for web adapter.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;

use crate::domain::error::CotError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
    /// Set for gate failures, which send the caller back to the public view.
    pub location: Option<&'static str>,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            location: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn gate_closed() -> Self {
        Self {
            status: StatusCode::SEE_OTHER,
            message: "admin view requires a valid auth code".into(),
            location: Some("/"),
        }
    }
}

pub fn status_from_error(err: &CotError) -> StatusCode {
    match err {
        CotError::DuplicatePair { .. } => StatusCode::CONFLICT,
        CotError::InvalidPair { .. } => StatusCode::BAD_REQUEST,
        CotError::UnknownPair { .. } => StatusCode::NOT_FOUND,
        CotError::Load { .. }
        | CotError::Export { .. }
        | CotError::ConfigParse { .. }
        | CotError::ConfigInvalid { .. }
        | CotError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<CotError> for WebError {
    fn from(err: CotError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if let Some(location) = self.location {
            return Redirect::to(location).into_response();
        }
        let body = json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}
