/// Authorization Header Parsing
///
/// The one routine every protected endpoint uses to turn a raw
/// `Authorization` header into verified claims.

use crate::auth::claims::Claims;
use crate::auth::jwt::TokenService;
use crate::error::AuthError;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from an `Authorization: Bearer <token>` header value
///
/// The prefix is case-sensitive with exactly one space. The token is the
/// second space-separated segment, so anything after a further space is
/// ignored.
///
/// # Errors
/// `AuthError::MissingOrMalformedAuthorization` when the header is absent
/// or does not carry the bearer prefix.
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header
        .filter(|value| value.starts_with(BEARER_PREFIX))
        .ok_or(AuthError::MissingOrMalformedAuthorization)?;

    value
        .split(' ')
        .nth(1)
        .ok_or(AuthError::MissingOrMalformedAuthorization)
}

/// Parse the header and verify the carried token
pub fn authorize(header: Option<&str>, tokens: &TokenService) -> Result<Claims, AuthError> {
    let token = extract_bearer_token(header)?;
    tokens.verify(token)
}
