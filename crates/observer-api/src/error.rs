//! Controller/service boundary errors and their envelope mapping.

use axum::{extract::rejection::JsonRejection, http::StatusCode};
use observer_core::{LogLevel, ValidationError};
use thiserror::Error;

use crate::envelope::ResponseEnvelope;

/// Fixed body for every internal failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Ocorreu um erro durante a execução da requisição.";

/// Fixed body for a request body that is not valid JSON for the endpoint.
pub const MALFORMED_BODY_MESSAGE: &str = "Corpo da requisição inválido.";

/// Resource an endpoint works on; selects the resource-specific messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User,
    Product,
}

impl Resource {
    pub fn invalid_id_message(self) -> &'static str {
        match self {
            Resource::User => "Informe um 'userId' válido para a requisição.",
            Resource::Product => "Informe um 'productId' válido para a requisição.",
        }
    }

    pub fn not_found_message(self) -> &'static str {
        match self {
            Resource::User => {
                "Nenhum usuário encontrado. O identificador informado não resultou em dados nesta ação."
            }
            Resource::Product => {
                "Nenhum produto encontrado. O identificador informado não resultou em dados nesta ação."
            }
        }
    }

    pub fn create_failed_message(self) -> &'static str {
        match self {
            Resource::User => "Ocorreu um erro durante a criação do usuário.",
            Resource::Product => "Ocorreu um erro durante a criação do produto.",
        }
    }
}

/// Every way a user or product request can fail.
///
/// The `Display` text is the client-facing `details`. `Internal` and
/// `MalformedBody` carry a cause, exposed through `source()` for the step log
/// and never sent to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", .0.invalid_id_message())]
    InvalidId(Resource),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{}", MALFORMED_BODY_MESSAGE)]
    MalformedBody(#[from] JsonRejection),

    #[error("{}", .0.not_found_message())]
    NotFound(Resource),

    #[error("{}", .0.create_failed_message())]
    CreateFailed(Resource),

    #[error("{}", INTERNAL_ERROR_MESSAGE)]
    Internal(#[from] observer_core::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidId(_) | ApiError::Validation(_) | ApiError::MalformedBody(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::CreateFailed(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Severity recorded on the request log for this failure.
    ///
    /// Only internal failures are ERROR. A create that came back without an
    /// identity is answered with a 500 but logged as WARN.
    pub fn level(&self) -> LogLevel {
        match self {
            ApiError::Internal(_) => LogLevel::Error,
            _ => LogLevel::Warn,
        }
    }

    pub fn into_envelope<T>(self) -> ResponseEnvelope<T> {
        ResponseEnvelope::message(self.status(), self.to_string())
    }
}

/// Parse a path identifier; anything unparsable or not positive is rejected.
pub fn parse_id(raw: &str, resource: Resource) -> Result<i32, ApiError> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::InvalidId(resource)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_id_accepts_positive() {
        assert_eq!(parse_id("42", Resource::User).unwrap(), 42);
    }

    #[test]
    fn test_parse_id_rejects_zero_negative_and_garbage() {
        for raw in ["0", "-1", "abc", "", "99999999999"] {
            assert!(matches!(
                parse_id(raw, Resource::Product),
                Err(ApiError::InvalidId(Resource::Product))
            ));
        }
    }

    #[test]
    fn test_invalid_id_message_and_status() {
        let err = ApiError::InvalidId(Resource::User);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Informe um 'userId' válido para a requisição."
        );
        assert_eq!(err.level(), LogLevel::Warn);
    }

    #[test]
    fn test_validation_uses_rule_message() {
        let err = ApiError::from(ValidationError::UserLastName);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Informe um sobrenome válido para o usuário."
        );
    }

    #[test]
    fn test_not_found_messages() {
        assert_eq!(ApiError::NotFound(Resource::User).status(), StatusCode::NOT_FOUND);
        assert!(ApiError::NotFound(Resource::Product)
            .to_string()
            .starts_with("Nenhum produto encontrado."));
        assert_eq!(ApiError::NotFound(Resource::User).level(), LogLevel::Warn);
    }

    #[test]
    fn test_internal_hides_cause_in_message() {
        let err = ApiError::from(observer_core::Error::Timeout(Duration::from_secs(1)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), INTERNAL_ERROR_MESSAGE);
        assert_eq!(err.level(), LogLevel::Error);

        let source = std::error::Error::source(&err).unwrap().to_string();
        assert_eq!(source, "Operation timed out after 1s");
    }

    #[test]
    fn test_create_failed_is_server_error() {
        let err = ApiError::CreateFailed(Resource::Product);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "Ocorreu um erro durante a criação do produto."
        );
        assert_eq!(err.level(), LogLevel::Warn);
    }

    #[test]
    fn test_into_envelope_has_no_data() {
        let envelope: ResponseEnvelope<i32> = ApiError::NotFound(Resource::User).into_envelope();
        assert_eq!(envelope.response_code, 404);
        assert!(envelope.data.is_none());
    }
}
