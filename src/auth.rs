use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::api::error::AppError;
use crate::api::routes::AppState;
use crate::models::internal::User;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Not authorized, no token")]
    MissingToken,
    #[error("Not authorized, token failed")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
    #[error("Not authorized, user not found")]
    UnknownUser,
    #[error("Token encoding failed: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub id: String,
    pub exp: usize,
}

/// Issue an HS256 session token for `user_id`.
pub fn issue_token(user_id: &str, secret: &str, ttl_days: u32) -> Result<String, AuthError> {
    let exp = chrono::Utc::now() + chrono::Duration::days(i64::from(ttl_days));
    let claims = Claims {
        id: user_id.to_string(),
        exp: exp.timestamp() as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(AuthError::Encode)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(AuthError::InvalidToken)
}

/// Accepts `Bearer <token>` as well as the bare token.
fn extract_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get("authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

/// Authenticated caller, loaded fresh from the database on every request.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts).ok_or(AuthError::MissingToken)?;
        let claims = verify_token(token, &state.config.jwt_secret)?;

        let user = state
            .users
            .find_by_id(&claims.id)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        Ok(AuthUser(user))
    }
}
