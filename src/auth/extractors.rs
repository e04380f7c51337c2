use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::auth::{jwt::JwtKeys, repo::User};
use crate::error::AppError;
use crate::state::AppState;

/// Resolves the bearer token on a request into the authenticated account.
///
/// Verifying the signature is not enough: the subject must still exist in
/// the store, so a deleted account stops authenticating before its tokens
/// expire. Every failure step yields the same 401.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(AppError::unauthorized)?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(AppError::unauthorized)?;

        let keys = JwtKeys::from_config(&state.config)?;
        let claims = keys.verify(token)?;

        let user = User::find_by_email(&state.db, &claims.sub)
            .await?
            .ok_or_else(AppError::unauthorized)?;

        Ok(CurrentUser(user))
    }
}
