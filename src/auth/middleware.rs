use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::{roles, token};
use crate::error::ApiError;
use crate::records::{Records, User, UserRole, UserStatus};
use crate::store::AppState;

/// Authenticated caller, extracted from the bearer token. Verifies the
/// signature and expiry first, then loads the user fresh from the store and
/// resolves the effective role — the token's embedded role is never trusted
/// for authorization.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub role: UserRole,
}

impl AuthUser {
    pub fn email(&self) -> &str {
        &self.user.email
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role != UserRole::Admin {
            return Err(ApiError::Forbidden);
        }
        Ok(())
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw_token = extract_bearer_token(parts).ok_or(ApiError::Unauthenticated)?;
        let claims = token::verify(&state.config.token_secret, &raw_token)?;

        let records = Records::new(state.store.clone());
        let user = records
            .find_user_by_id(&claims.sub)
            .await?
            .ok_or(ApiError::Unauthenticated)?;
        if user.status != UserStatus::Active {
            return Err(ApiError::Unauthenticated);
        }

        let role = roles::resolve(&records, &state.config.admin_allowlist, &user).await?;
        Ok(Self { user, role })
    }
}

fn extract_bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    if token.is_empty() {
        return None;
    }
    Some(token.to_owned())
}
