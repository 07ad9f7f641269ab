/// Access Token Codec
///
/// Short-lived, stateless HS256 tokens. Validity is derived entirely from
/// the signature and the embedded timestamps; there is no revocation path,
/// the short TTL is the mitigation.

use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::error::{AppError, AuthError};

/// Fixed issuer tag. Scopes tokens to this service's access-token
/// namespace: a token signed with the same secret for another purpose does
/// not validate here.
pub const ACCESS_TOKEN_ISSUER: &str = "chirps-access";

/// Issue an access token for a user.
///
/// `iat` is now (UTC), `exp` is now + `ttl_seconds`; the caller picks the
/// window (the session handlers use the configured 1-hour TTL).
pub fn issue_access_token(
    user_id: Uuid,
    token_secret: &str,
    ttl_seconds: i64,
) -> Result<String, AppError> {
    let claims = Claims::new(user_id, ACCESS_TOKEN_ISSUER, ttl_seconds);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(token_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token signing failed: {}", e)))
}

/// Validate an access token and return its subject.
///
/// Fails with `SignatureInvalid` on a bad signature or unparseable token,
/// `TokenExpired` once `exp` has passed (no leeway), `IssuerMismatch` when
/// the issuer claim is not ours, and `MalformedSubject` when the subject is
/// not a UUID.
pub fn validate_access_token(token: &str, token_secret: &str) -> Result<Uuid, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ACCESS_TOKEN_ISSUER]);
    validation.leeway = 0;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(token_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidIssuer => AuthError::IssuerMismatch,
        _ => AuthError::SignatureInvalid,
    })?;

    data.claims.user_id()
}
