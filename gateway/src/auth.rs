use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by the session token. The token is issued by the auth
/// collaborator; this service only verifies and consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    /// Expiry as seconds since the epoch.
    pub exp: u64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

/// Verify a session token against the shared secret, checking signature
/// and expiry. Pure: no transport, no clock beyond the validator's own
/// expiry check, and every failure mode collapses into an `AuthError`
/// instead of propagating library details.
pub fn verify_token(token: &str, secret: &[u8]) -> Result<Claims, AuthError> {
    let validation = Validation::new(Algorithm::HS256);
    match decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation) {
        Ok(data) => Ok(data.claims),
        Err(error) => match error.kind() {
            ErrorKind::ExpiredSignature => Err(AuthError::Expired),
            _ => Err(AuthError::Invalid),
        },
    }
}

#[cfg(test)]
pub(crate) mod test_tokens {
    use super::Claims;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    /// Sign a token the way the auth collaborator would.
    pub fn issue(secret: &[u8], expires_in: Duration, expired: bool) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before epoch");
        let exp = if expired {
            now.checked_sub(expires_in).unwrap_or(Duration::ZERO)
        } else {
            now + expires_in
        };
        let claims = Claims {
            user_id: "user-42".to_string(),
            email: "user@example.com".to_string(),
            username: "tester".to_string(),
            exp: exp.as_secs(),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
            .expect("token encoding")
    }
}
