/// Credential Extraction
///
/// Pulls bearer tokens and the webhook API key out of the `Authorization`
/// header. Both schemes multiplex the same header, disambiguated by prefix;
/// a request can present one or the other, never both. Prefix matching is
/// exact: case-sensitive, single space, remainder returned verbatim.

use actix_web::http::header::{self, HeaderMap};

use crate::error::{AppError, AuthError};

const BEARER_PREFIX: &str = "Bearer ";
const API_KEY_PREFIX: &str = "ApiKey ";

fn authorization_with_prefix(headers: &HeaderMap, prefix: &str) -> Result<String, AppError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(prefix))
        .map(str::to_owned)
        .ok_or_else(|| AuthError::MissingCredential.into())
}

/// Extract the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    authorization_with_prefix(headers, BEARER_PREFIX)
}

/// Extract the key from `Authorization: ApiKey <key>`.
pub fn api_key(headers: &HeaderMap) -> Result<String, AppError> {
    authorization_with_prefix(headers, API_KEY_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::HeaderValue;

    fn headers_with_authorization(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        let headers = headers_with_authorization("Bearer abc123");
        assert_eq!(bearer_token(&headers).unwrap(), "abc123");
    }

    #[test]
    fn api_key_header_is_not_a_bearer_token() {
        let headers = headers_with_authorization("ApiKey xyz");
        assert!(matches!(
            bearer_token(&headers),
            Err(AppError::Auth(AuthError::MissingCredential))
        ));
    }

    #[test]
    fn missing_header_yields_missing_credential() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(AppError::Auth(AuthError::MissingCredential))
        ));
        assert!(matches!(
            api_key(&headers),
            Err(AppError::Auth(AuthError::MissingCredential))
        ));
    }

    #[test]
    fn bearer_prefix_is_case_sensitive() {
        let headers = headers_with_authorization("bearer abc123");
        assert!(bearer_token(&headers).is_err());
    }

    #[test]
    fn bearer_without_space_does_not_match() {
        let headers = headers_with_authorization("Bearerabc123");
        assert!(bearer_token(&headers).is_err());
    }

    #[test]
    fn api_key_is_extracted() {
        let headers = headers_with_authorization("ApiKey f271c81ff7084ee5b99a5091b42d486e");
        assert_eq!(api_key(&headers).unwrap(), "f271c81ff7084ee5b99a5091b42d486e");
    }

    #[test]
    fn bearer_header_is_not_an_api_key() {
        let headers = headers_with_authorization("Bearer abc123");
        assert!(api_key(&headers).is_err());
    }
}
