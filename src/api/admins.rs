use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::records::{AdminEntry, Records};
use crate::registry;
use crate::store::AppState;

#[derive(Debug, Deserialize)]
pub struct AddAdminRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub items: Vec<AdminEntry>,
    pub total: usize,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admins", get(list_admins).post(add_admin))
        .route("/api/admins/{email}", delete(remove_admin))
}

async fn list_admins(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ListResponse>, ApiError> {
    auth.require_admin()?;
    let records = Records::new(state.store.clone());
    let items = registry::list(&records).await?;
    let total = items.len();
    Ok(Json(ListResponse { items, total }))
}

async fn add_admin(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<AddAdminRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;
    let records = Records::new(state.store.clone());
    let entry = registry::add(&records, &req.email, auth.email()).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn remove_admin(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(email): Path<String>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;
    let records = Records::new(state.store.clone());
    registry::remove(&records, &email).await?;
    Ok(StatusCode::NO_CONTENT)
}
