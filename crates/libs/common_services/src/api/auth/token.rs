use crate::api::auth::error::AuthError;
use crate::api::auth::interfaces::AuthClaims;
use jsonwebtoken::{DecodingKey, Validation, decode};

/// Verifies an HS256 bearer token and returns its claims.
///
/// # Errors
///
/// * `AuthError::InvalidToken` if the signature, expiry or payload is invalid.
pub fn decode_token(token: &str, jwt_secret: &str) -> Result<AuthClaims, AuthError> {
    decode::<AuthClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)
}
