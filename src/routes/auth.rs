use axum::http::{HeaderMap, header::AUTHORIZATION};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::UserId;

/// Token claims issued by the identity service. `sub` is the user's UUID.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Resolves the caller from an `Authorization: Bearer <jwt>` header.
pub fn extract_current_user(secret: &str, headers: &HeaderMap) -> Result<UserId, ApiError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized("Missing authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized("Invalid authorization header"))?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|error| {
        tracing::debug!(%error, "rejected bearer token");
        ApiError::Unauthorized("Invalid token")
    })?;

    token_data
        .claims
        .sub
        .parse()
        .map_err(|_| ApiError::Unauthorized("Invalid token subject"))
}

#[cfg(test)]
pub(crate) fn issue_test_token(secret: &str, user_id: UserId, exp: usize) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};

    encode(
        &Header::default(),
        &Claims {
            sub: user_id.to_string(),
            exp,
        },
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token encodes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret";

    fn far_future() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn accepts_valid_token() {
        let user = UserId::new();
        let token = issue_test_token(SECRET, user, far_future());

        assert_eq!(extract_current_user(SECRET, &bearer(&token)).unwrap(), user);
    }

    #[test]
    fn rejects_missing_header() {
        let result = extract_current_user(SECRET, &HeaderMap::new());
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = issue_test_token("other-secret", UserId::new(), far_future());
        let result = extract_current_user(SECRET, &bearer(&token));
        assert!(matches!(result, Err(ApiError::Unauthorized("Invalid token"))));
    }

    #[test]
    fn rejects_expired_token() {
        let expired = (chrono::Utc::now().timestamp() - 3600) as usize;
        let token = issue_test_token(SECRET, UserId::new(), expired);
        let result = extract_current_user(SECRET, &bearer(&token));
        assert!(matches!(result, Err(ApiError::Unauthorized("Invalid token"))));
    }
}
