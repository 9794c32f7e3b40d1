//! Error types for entity API
use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

use sea_orm::error::{DbErr, SqlErr};

/// Errors while executing operations related to entities.
/// The intent is to categorize errors into two major types:
///  * Errors related to data. Ex DbError::RecordNotFound
///  * Errors related to interactions with the database itself. Ex DbError::Conn
#[derive(Debug, PartialEq)]
pub struct Error {
    // Underlying error emitted from seaORM internals
    pub source: Option<DbErr>,
    // Enum representing which category of error
    pub error_kind: EntityApiErrorKind,
}

#[derive(Debug, PartialEq, Serialize)]
pub enum EntityApiErrorKind {
    // Invalid search term
    InvalidQueryTerm,
    // Record not found
    RecordNotFound,
    // Record not updated
    RecordNotUpdated,
    // Record not authenticated
    RecordUnauthenticated,
    // A unique constraint rejected the write
    RecordAlreadyExists,
    // Errors related to interactions with the database itself. Ex DbError::Conn
    SystemError,
    // Validation error, including references to rows that don't exist
    ValidationError,
    // Other errors
    Other,
}

impl Error {
    pub fn new(error_kind: EntityApiErrorKind) -> Self {
        Error {
            source: None,
            error_kind,
        }
    }

    pub fn not_found() -> Self {
        Self::new(EntityApiErrorKind::RecordNotFound)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Entity API Error: {:?}", self)
    }
}

impl StdError for Error {}

/// Constraint violations are reported by the driver as Exec/Query errors,
/// so `sql_err` is consulted before falling back on the variant.
fn classify(sql_err: Option<SqlErr>, err: &DbErr) -> EntityApiErrorKind {
    match sql_err {
        Some(SqlErr::UniqueConstraintViolation(_)) => EntityApiErrorKind::RecordAlreadyExists,
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => EntityApiErrorKind::ValidationError,
        _ => match err {
            DbErr::RecordNotFound(_) => EntityApiErrorKind::RecordNotFound,
            DbErr::RecordNotUpdated => EntityApiErrorKind::RecordNotUpdated,
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) | DbErr::Exec(_) => {
                EntityApiErrorKind::SystemError
            }
            DbErr::Type(_) | DbErr::Json(_) => EntityApiErrorKind::InvalidQueryTerm,
            _ => EntityApiErrorKind::SystemError,
        },
    }
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        let error_kind = classify(err.sql_err(), &err);

        Error {
            source: Some(err),
            error_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_not_found_maps_to_record_not_found() {
        let error: Error = DbErr::RecordNotFound("customers".to_string()).into();
        assert_eq!(error.error_kind, EntityApiErrorKind::RecordNotFound);
        assert!(error.source.is_some());
    }

    #[test]
    fn connection_failures_map_to_system_error() {
        let error: Error = DbErr::Custom("boom".to_string()).into();
        assert_eq!(error.error_kind, EntityApiErrorKind::SystemError);
    }

    #[test]
    fn unique_violations_map_to_record_already_exists() {
        let err = DbErr::Custom("duplicate key value".to_string());
        let kind = classify(
            Some(SqlErr::UniqueConstraintViolation(
                "customers_organization_external_ref_unique".to_string(),
            )),
            &err,
        );
        assert_eq!(kind, EntityApiErrorKind::RecordAlreadyExists);
    }

    #[test]
    fn foreign_key_violations_map_to_validation_error() {
        let err = DbErr::Custom("violates foreign key constraint".to_string());
        let kind = classify(
            Some(SqlErr::ForeignKeyConstraintViolation(
                "fk_tickets_customer".to_string(),
            )),
            &err,
        );
        assert_eq!(kind, EntityApiErrorKind::ValidationError);
    }

    #[test]
    fn type_errors_map_to_invalid_query_term() {
        let error: Error = DbErr::Type("not a uuid".to_string()).into();
        assert_eq!(error.error_kind, EntityApiErrorKind::InvalidQueryTerm);
    }
}
