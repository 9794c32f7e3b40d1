use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use domain::error::{
    DomainErrorKind, EntityErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind,
};
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub(crate) status_code: u16,
    pub(crate) error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,
}

pub(crate) fn error_response(status: StatusCode, message: Option<String>) -> Response {
    let body = ErrorBody {
        status_code: status.as_u16(),
        error: status
            .canonical_reason()
            .unwrap_or("UNKNOWN")
            .to_uppercase(),
        message,
    };
    (status, Json(body)).into_response()
}

impl Error {
    fn status_and_message(&self) -> (StatusCode, Option<String>) {
        match &self.0.error_kind {
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                    EntityErrorKind::NotFound => (StatusCode::NOT_FOUND, None),
                    EntityErrorKind::Invalid => (
                        StatusCode::BAD_REQUEST,
                        Some("the request references invalid data".to_string()),
                    ),
                    EntityErrorKind::Unauthenticated => (StatusCode::UNAUTHORIZED, None),
                    EntityErrorKind::Conflict => (
                        StatusCode::CONFLICT,
                        Some("a record with the same unique value already exists".to_string()),
                    ),
                    EntityErrorKind::DbTransaction | EntityErrorKind::Other(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, None)
                    }
                },
                InternalErrorKind::Validation(message) => {
                    (StatusCode::BAD_REQUEST, Some(message.clone()))
                }
                InternalErrorKind::Forbidden => (StatusCode::FORBIDDEN, None),
                InternalErrorKind::Config | InternalErrorKind::Other(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, None)
                }
            },
            DomainErrorKind::External(external_error_kind) => match external_error_kind {
                ExternalErrorKind::Network => (StatusCode::BAD_GATEWAY, None),
                ExternalErrorKind::Other(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
            },
        }
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            error!("Request failed with {status}: {:?}", self.0);
        } else {
            debug!("Request rejected with {status}: {:?}", self.0.error_kind);
        }

        error_response(status, message)
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    async fn render(err: DomainError) -> (StatusCode, Value) {
        let response = Error::from(err).into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_errors_carry_their_message() {
        let (status, body) = render(DomainError::validation("name is required")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"status_code": 400, "error": "BAD REQUEST", "message": "name is required"})
        );
    }

    #[tokio::test]
    async fn error_kinds_map_to_status_codes() {
        assert_eq!(render(DomainError::not_found()).await.0, StatusCode::NOT_FOUND);
        assert_eq!(render(DomainError::forbidden()).await.0, StatusCode::FORBIDDEN);
        assert_eq!(
            render(DomainError::unauthenticated()).await.0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            render(DomainError::config()).await.0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            render(entity_error(EntityErrorKind::Conflict)).await.0,
            StatusCode::CONFLICT
        );
    }

    fn entity_error(kind: EntityErrorKind) -> DomainError {
        DomainError {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(kind)),
        }
    }

    #[tokio::test]
    async fn duplicate_records_are_conflicts() {
        let (status, body) = render(entity_error(EntityErrorKind::Conflict)).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["status_code"], 409);
        assert_eq!(body["error"], "CONFLICT");
    }

    #[tokio::test]
    async fn dangling_references_are_bad_requests() {
        let (status, body) = render(entity_error(EntityErrorKind::Invalid)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BAD REQUEST");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn server_errors_hide_internal_details() {
        let (status, body) = render(DomainError {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "connection string postgres://secret".to_string(),
            )),
        })
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"status_code": 500, "error": "INTERNAL SERVER ERROR"})
        );
    }

    #[tokio::test]
    async fn upstream_network_failures_are_bad_gateway() {
        let (status, _) = render(DomainError {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
        })
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
