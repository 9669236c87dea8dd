//! Uniform response body for every user and product endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// `{"responseCode", "details", "data"}` wrapper returned on success and
/// failure alike. `data` is omitted when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope<T> {
    pub response_code: u16,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ResponseEnvelope<T> {
    pub fn with_data(status: StatusCode, details: impl Into<String>, data: T) -> Self {
        Self {
            response_code: status.as_u16(),
            details: details.into(),
            data: Some(data),
        }
    }

    pub fn message(status: StatusCode, details: impl Into<String>) -> Self {
        Self {
            response_code: status.as_u16(),
            details: details.into(),
            data: None,
        }
    }

    /// HTTP status carried by the envelope; unknown codes map to 500.
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.response_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl<T: Serialize> IntoResponse for ResponseEnvelope<T> {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}
