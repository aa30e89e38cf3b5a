use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::records::UserRole;
use crate::store::AppState;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Effective role after resolution, not the role minted into the token.
    pub role: UserRole,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/auth/me", get(me))
}

async fn me(auth: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: auth.user.id.clone(),
        email: auth.user.email.clone(),
        first_name: auth.user.first_name.clone(),
        last_name: auth.user.last_name.clone(),
        role: auth.role,
    })
}
