/// Unified Error Handling
///
/// Domain-specific error enums feeding a single `AppError` that maps onto
/// HTTP responses at the actix boundary. Credential failures intentionally
/// collapse to one public body: the concrete variant is logged, never sent.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use sqlx::error::DatabaseError as SqlxDatabaseError;
use std::error::Error as StdError;
use std::fmt;

/// Input validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    InvalidEmail,
    ChirpTooLong(usize),
    InvalidIdentifier(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidEmail => write!(f, "email has invalid format"),
            ValidationError::ChirpTooLong(max) => {
                write!(f, "chirp is too long (maximum {} characters)", max)
            }
            ValidationError::InvalidIdentifier(field) => {
                write!(f, "{} is not a valid identifier", field)
            }
        }
    }
}

impl StdError for ValidationError {}

/// Database operation errors
#[derive(Debug)]
pub enum DatabaseError {
    UniqueViolation(String),
    NotFound(String),
    ConnectionPool(String),
    Unexpected(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::UniqueViolation(what) => write!(f, "duplicate entry: {}", what),
            DatabaseError::NotFound(what) => write!(f, "not found: {}", what),
            DatabaseError::ConnectionPool(msg) => write!(f, "connection error: {}", msg),
            DatabaseError::Unexpected(msg) => write!(f, "database error: {}", msg),
        }
    }
}

impl StdError for DatabaseError {}

/// Authentication and authorization failures.
///
/// Every variant is answered with the same 401 body; the distinctions exist
/// for internal logging and for callers inside the crate (e.g. revoke's
/// not-found rule), not for end users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Bearer `/`ApiKey ` credential in the Authorization header.
    MissingCredential,
    /// Unknown email or wrong password, or a mismatched webhook key.
    InvalidCredentials,
    /// Access token signature did not verify (or the token is garbage).
    SignatureInvalid,
    /// Access token expiry has passed.
    TokenExpired,
    /// Access token was signed for a different token namespace.
    IssuerMismatch,
    /// Access token subject does not parse as a user identifier.
    MalformedSubject,
    /// Refresh token absent, revoked, or past its expiry.
    RefreshTokenInvalid,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingCredential => write!(f, "no credential in request headers"),
            AuthError::InvalidCredentials => write!(f, "invalid credentials"),
            AuthError::SignatureInvalid => write!(f, "token signature invalid"),
            AuthError::TokenExpired => write!(f, "token expired"),
            AuthError::IssuerMismatch => write!(f, "token issuer mismatch"),
            AuthError::MalformedSubject => write!(f, "token subject malformed"),
            AuthError::RefreshTokenInvalid => write!(f, "refresh token invalid"),
        }
    }
}

impl StdError for AuthError {}

/// Central application error type
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Database(DatabaseError),
    Auth(AuthError),
    /// Password hashing primitive failed (malformed PHC string, parameter
    /// error). Distinct from a non-matching password, which is Ok(false).
    Hashing(String),
    /// The secure random source failed. Fatal to the issuing request.
    EntropySource(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Database(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Hashing(msg) => write!(f, "password hashing failed: {}", msg),
            AppError::EntropySource(msg) => write!(f, "entropy source failed: {}", msg),
            AppError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => {
                AppError::Database(DatabaseError::NotFound("record".to_string()))
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                AppError::Database(DatabaseError::ConnectionPool(err.to_string()))
            }
            sqlx::Error::Database(db_err) => {
                // 23505 = unique_violation
                if db_err.code().as_deref() == Some("23505") {
                    AppError::Database(DatabaseError::UniqueViolation(
                        "email already registered".to_string(),
                    ))
                } else {
                    AppError::Database(DatabaseError::Unexpected(err.to_string()))
                }
            }
            _ => AppError::Database(DatabaseError::Unexpected(err.to_string())),
        }
    }
}

/// JSON body sent to clients on failure
#[derive(Debug, serde::Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    /// The message clients are allowed to see. Credential failures all map
    /// to the same string so the response carries no oracle about which
    /// check rejected the request.
    fn public_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::Database(DatabaseError::NotFound(what)) => format!("not found: {}", what),
            AppError::Database(DatabaseError::UniqueViolation(what)) => what.clone(),
            AppError::Database(DatabaseError::ConnectionPool(_)) => {
                "service temporarily unavailable".to_string()
            }
            AppError::Auth(_) => "unauthorized".to_string(),
            AppError::Database(_)
            | AppError::Hashing(_)
            | AppError::EntropySource(_)
            | AppError::Internal(_) => "something went wrong".to_string(),
        }
    }

    fn log(&self) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(error = %e, "request validation failed");
            }
            AppError::Auth(e) => {
                tracing::warn!(error = %e, "authentication failed");
            }
            AppError::Database(DatabaseError::NotFound(what)) => {
                tracing::info!(what = %what, "lookup missed");
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "database operation failed");
            }
            AppError::Hashing(msg) => {
                tracing::error!(error = %msg, "password hashing failed");
            }
            AppError::EntropySource(msg) => {
                tracing::error!(error = %msg, "entropy source failed");
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(e) => match e {
                DatabaseError::NotFound(_) => StatusCode::NOT_FOUND,
                DatabaseError::UniqueViolation(_) => StatusCode::CONFLICT,
                DatabaseError::ConnectionPool(_) => StatusCode::SERVICE_UNAVAILABLE,
                DatabaseError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Hashing(_) | AppError::EntropySource(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.log();
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.public_message(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_all_map_to_unauthorized() {
        let variants = [
            AuthError::MissingCredential,
            AuthError::InvalidCredentials,
            AuthError::SignatureInvalid,
            AuthError::TokenExpired,
            AuthError::IssuerMismatch,
            AuthError::MalformedSubject,
            AuthError::RefreshTokenInvalid,
        ];
        for v in variants {
            assert_eq!(AppError::Auth(v).status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn auth_errors_share_one_public_message() {
        let expired = AppError::Auth(AuthError::TokenExpired).public_message();
        let bad_sig = AppError::Auth(AuthError::SignatureInvalid).public_message();
        let missing = AppError::Auth(AuthError::MissingCredential).public_message();
        assert_eq!(expired, bad_sig);
        assert_eq!(expired, missing);
    }

    #[test]
    fn hashing_failure_is_internal_and_opaque() {
        let err = AppError::Hashing("phc parse error".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("phc"));
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = AppError::Database(DatabaseError::NotFound("chirp".to_string()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_error_display() {
        let err = ValidationError::ChirpTooLong(140);
        assert_eq!(err.to_string(), "chirp is too long (maximum 140 characters)");
    }
}
