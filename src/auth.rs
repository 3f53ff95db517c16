use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{queries, DbPool};
use crate::error::ApiError;
use crate::models::authority::AuthorityUser;
use crate::state::AppState;

pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub email: String,
    pub exp: i64,
}

pub fn issue_token(
    secret: &str,
    user_id: Uuid,
    email: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        user_id,
        email: email.to_string(),
        exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Authenticated caller, extracted from the Authorization bearer token.
/// Missing or malformed headers and invalid or expired tokens are all 401.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Access token required"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Access token required"))?;
        let claims = verify_token(&state.config.jwt_secret, token)
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;
        Ok(Self {
            user_id: claims.user_id,
            email: claims.email,
        })
    }
}

/// Loads the caller's verified authority profile; 403 when absent or
/// unverified. Checked per request, never cached in the token.
pub async fn require_authority(pool: &DbPool, user_id: Uuid) -> Result<AuthorityUser, ApiError> {
    sqlx::query_as::<_, AuthorityUser>(queries::SELECT_VERIFIED_AUTHORITY_BY_USER)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::forbidden("Access denied. Authority verification required."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_preserves_claims() {
        let user_id = Uuid::new_v4();
        let token = issue_token("test-secret", user_id, "rider@example.com").unwrap();
        let claims = verify_token("test-secret", &token).unwrap();
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.email, "rider@example.com");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("secret-a", Uuid::new_v4(), "rider@example.com").unwrap();
        assert!(verify_token("secret-b", &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            user_id: Uuid::new_v4(),
            email: "rider@example.com".to_string(),
            // beyond the default 60s validation leeway
            exp: (Utc::now() - Duration::minutes(5)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(verify_token("test-secret", &token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_token("test-secret", "not-a-jwt").is_err());
    }
}
