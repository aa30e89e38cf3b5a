use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::deals::lifecycle::{self, DealFilter, SubmitDeal};
use crate::error::ApiError;
use crate::records::{Deal, DealStatus, Records};
use crate::store::AppState;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub partner: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub items: Vec<Deal>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/deals", post(submit_deal).get(list_deals))
        .route("/api/deals/{id}/approve", post(approve_deal))
        .route("/api/deals/{id}/reject", post(reject_deal))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn submit_deal(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SubmitDeal>,
) -> Result<impl IntoResponse, ApiError> {
    let records = Records::new(state.store.clone());
    let submitted = lifecycle::submit(&records, &auth.user, &req).await?;
    Ok((StatusCode::CREATED, Json(submitted)))
}

async fn list_deals(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<DealStatus>)
        .transpose()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let filter = DealFilter {
        status,
        partner_company: params.partner,
        limit: params.limit.unwrap_or(50),
    };

    let records = Records::new(state.store.clone());
    let items = lifecycle::list(&records, &filter).await?;
    let total = items.len();
    Ok(Json(ListResponse { items, total }))
}

async fn approve_deal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Deal>, ApiError> {
    auth.require_admin()?;
    let records = Records::new(state.store.clone());
    let deal = lifecycle::approve(&records, auth.email(), &id).await?;
    Ok(Json(deal))
}

async fn reject_deal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<RejectRequest>,
) -> Result<Json<Deal>, ApiError> {
    auth.require_admin()?;
    let records = Records::new(state.store.clone());
    let deal = lifecycle::reject(&records, auth.email(), &id, &req.reason).await?;
    Ok(Json(deal))
}
