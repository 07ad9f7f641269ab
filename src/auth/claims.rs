/// Access-token claim set (RFC 7519 registered claims only).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AuthError};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Issuer: the fixed tag scoping this service's access tokens.
    pub iss: String,
    /// Subject: the user ID as a UUID string.
    pub sub: String,
    /// Issued at (Unix timestamp, UTC).
    pub iat: i64,
    /// Expiration time (Unix timestamp, UTC).
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, issuer: &str, ttl_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            iss: issuer.to_string(),
            sub: user_id.to_string(),
            iat: now,
            exp: now + ttl_seconds,
        }
    }

    /// Parse the subject back into a user identifier.
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::MalformedSubject.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_carry_subject_and_window() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "test-issuer", 3600);

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn subject_parses_back_to_user_id() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "test-issuer", 3600);

        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn garbage_subject_is_malformed() {
        let mut claims = Claims::new(Uuid::new_v4(), "test-issuer", 3600);
        claims.sub = "not-a-uuid".to_string();

        assert!(matches!(
            claims.user_id(),
            Err(AppError::Auth(AuthError::MalformedSubject))
        ));
    }
}
