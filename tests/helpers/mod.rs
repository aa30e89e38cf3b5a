#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use dealdesk::auth::{NewIdentity, provision_user, token};
use dealdesk::config::Config;
use dealdesk::records::{Records, User};
use dealdesk::store::AppState;
use dealdesk::store::memory::MemoryStore;

pub const TOKEN_SECRET: &str = "test-secret";
pub const ALLOWLISTED_ADMIN: &str = "ops@dealdesk.io";

/// Build a test `AppState` on a fresh in-memory store:
/// - all tables seeded with header rows only
/// - `ops@dealdesk.io` on the static operator allowlist
pub fn test_state() -> AppState {
    let config = Config {
        listen: "127.0.0.1:0".into(),
        sheet_endpoint: String::new(),
        sheet_id: String::new(),
        sheet_api_token: None,
        token_secret: TOKEN_SECRET.into(),
        token_ttl_hours: 24,
        admin_allowlist: vec![ALLOWLISTED_ADMIN.into()],
        dev_mode: true,
    };
    AppState {
        store: Arc::new(MemoryStore::seeded()),
        config: Arc::new(config),
    }
}

pub fn app(state: &AppState) -> Router {
    Router::new()
        .merge(dealdesk::api::router())
        .with_state(state.clone())
}

pub fn records(state: &AppState) -> Records {
    Records::new(state.store.clone())
}

/// Provision a user the way the post-OAuth landing point would.
pub async fn provision(state: &AppState, email: &str, company: &str) -> User {
    provision_user(
        &records(state),
        &NewIdentity {
            email,
            first_name: "Test",
            last_name: "User",
            partner_company: company,
            territory: "EMEA",
        },
    )
    .await
    .expect("provisioning failed")
}

/// Mint a session token for a provisioned user.
pub fn session_token(user: &User) -> String {
    token::issue(TOKEN_SECRET, &user.id, &user.email, user.role, 24).expect("token issue failed")
}

/// Provision a user and hand back a ready-to-use bearer token.
pub async fn provisioned_token(state: &AppState, email: &str, company: &str) -> String {
    let user = provision(state, email, company).await;
    session_token(&user)
}

/// Drive one request through the router and parse the JSON body (Null when
/// the response has no body).
pub async fn req(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request build failed"),
        None => builder.body(Body::empty()).expect("request build failed"),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request dispatch failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body read failed")
        .to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response was not JSON")
    };
    (status, json)
}

/// A complete, valid deal submission payload.
pub fn acme_payload() -> Value {
    serde_json::json!({
        "company_name": "Acme",
        "domain": "acme.com",
        "partner_company": "X",
        "submitter_name": "A B",
        "submitter_email": "a@x.com",
        "territory": "EMEA",
        "deal_value": "600000",
        "deal_stage": "negotiation",
        "expected_close_date": "2026-10-01",
        "contract_type": "new",
        "agreed_to_terms": true,
    })
}
