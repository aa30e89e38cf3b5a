mod helpers;

use axum::http::StatusCode;
use helpers::{ALLOWLISTED_ADMIN, acme_payload, app, provisioned_token, records, req, test_state};

#[tokio::test]
async fn submit_creates_deal_with_estimate_band() {
    let state = test_state();
    let app = app(&state);
    let token = provisioned_token(&state, "a@x.com", "X").await;

    let (status, body) = req(&app, "POST", "/api/deals", Some(&token), Some(acme_payload())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "submitted");
    assert_eq!(body["estimated_approval_time"], "3-5 business days");

    let deal_id = body["deal_id"].as_str().expect("deal_id present");
    let (deal, _) = records(&state)
        .find_deal(deal_id)
        .await
        .unwrap()
        .expect("deal persisted");
    assert_eq!(deal.company_name, "Acme");
    assert!(deal.approved_by.is_empty());
    assert!(deal.approved_at.is_empty());
    assert!(deal.rejection_reason.is_empty());
}

#[tokio::test]
async fn submit_requires_auth() {
    let state = test_state();
    let app = app(&state);
    let (status, _) = req(&app, "POST", "/api/deals", None, Some(acme_payload())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn submit_without_terms_is_unprocessable() {
    let state = test_state();
    let app = app(&state);
    let token = provisioned_token(&state, "a@x.com", "X").await;

    let mut payload = acme_payload();
    payload["agreed_to_terms"] = serde_json::json!(false);
    let (status, _) = req(&app, "POST", "/api/deals", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn duplicate_submission_returns_conflict_with_duplicates() {
    let state = test_state();
    let app = app(&state);
    let token = provisioned_token(&state, "a@x.com", "X").await;

    let (status, _) = req(&app, "POST", "/api/deals", Some(&token), Some(acme_payload())).await;
    assert_eq!(status, StatusCode::CREATED);

    // different casing, same registration
    let mut payload = acme_payload();
    payload["company_name"] = serde_json::json!("ACME CORP");
    payload["domain"] = serde_json::json!("ACME.COM");
    let (status, body) = req(&app, "POST", "/api/deals", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let duplicates = body["duplicates"].as_array().expect("duplicate set returned");
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0]["domain"], "acme.com");

    // nothing new was written
    assert_eq!(records(&state).deals().await.unwrap().len(), 1);
}

#[tokio::test]
async fn resubmission_allowed_after_rejection() {
    let state = test_state();
    let app = app(&state);
    let token = provisioned_token(&state, "a@x.com", "X").await;
    let admin = provisioned_token(&state, ALLOWLISTED_ADMIN, "Ops").await;

    let (_, body) = req(&app, "POST", "/api/deals", Some(&token), Some(acme_payload())).await;
    let deal_id = body["deal_id"].as_str().unwrap().to_owned();

    let (status, _) = req(
        &app,
        "POST",
        &format!("/api/deals/{deal_id}/reject"),
        Some(&admin),
        Some(serde_json::json!({ "reason": "not a fit" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // rejected deals do not block a new registration for the same company
    let (status, _) = req(&app, "POST", "/api/deals", Some(&token), Some(acme_payload())).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn approve_flow_writes_audit_and_is_single_shot() {
    let state = test_state();
    let app = app(&state);
    let token = provisioned_token(&state, "a@x.com", "X").await;
    let admin = provisioned_token(&state, ALLOWLISTED_ADMIN, "Ops").await;

    let (_, body) = req(&app, "POST", "/api/deals", Some(&token), Some(acme_payload())).await;
    let deal_id = body["deal_id"].as_str().unwrap().to_owned();

    let (status, body) = req(
        &app,
        "POST",
        &format!("/api/deals/{deal_id}/approve"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");
    assert_eq!(body["approved_by"], ALLOWLISTED_ADMIN);

    // exactly one audit entry
    let audit = records(&state).audit_for_deal(&deal_id).await.unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, "approved");
    assert_eq!(audit[0].actor_email, ALLOWLISTED_ADMIN);

    // second approve refused, state unchanged, no double-logging
    let (status, _) = req(
        &app,
        "POST",
        &format!("/api/deals/{deal_id}/approve"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (deal, _) = records(&state).find_deal(&deal_id).await.unwrap().unwrap();
    assert_eq!(deal.status.as_str(), "approved");
    assert_eq!(records(&state).audit_for_deal(&deal_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn reject_requires_non_blank_reason() {
    let state = test_state();
    let app = app(&state);
    let token = provisioned_token(&state, "a@x.com", "X").await;
    let admin = provisioned_token(&state, ALLOWLISTED_ADMIN, "Ops").await;

    let (_, body) = req(&app, "POST", "/api/deals", Some(&token), Some(acme_payload())).await;
    let deal_id = body["deal_id"].as_str().unwrap().to_owned();

    let (status, _) = req(
        &app,
        "POST",
        &format!("/api/deals/{deal_id}/reject"),
        Some(&admin),
        Some(serde_json::json!({ "reason": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // still submitted
    let (deal, _) = records(&state).find_deal(&deal_id).await.unwrap().unwrap();
    assert_eq!(deal.status.as_str(), "submitted");
}

#[tokio::test]
async fn partner_user_cannot_approve() {
    let state = test_state();
    let app = app(&state);
    let token = provisioned_token(&state, "a@x.com", "X").await;

    let (_, body) = req(&app, "POST", "/api/deals", Some(&token), Some(acme_payload())).await;
    let deal_id = body["deal_id"].as_str().unwrap().to_owned();

    let (status, _) = req(
        &app,
        "POST",
        &format!("/api/deals/{deal_id}/approve"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn list_filters_by_status() {
    let state = test_state();
    let app = app(&state);
    let token = provisioned_token(&state, "a@x.com", "X").await;
    let admin = provisioned_token(&state, ALLOWLISTED_ADMIN, "Ops").await;

    let (_, body) = req(&app, "POST", "/api/deals", Some(&token), Some(acme_payload())).await;
    let first_id = body["deal_id"].as_str().unwrap().to_owned();

    let mut other = acme_payload();
    other["company_name"] = serde_json::json!("Globex");
    other["domain"] = serde_json::json!("globex.com");
    req(&app, "POST", "/api/deals", Some(&token), Some(other)).await;

    req(
        &app,
        "POST",
        &format!("/api/deals/{first_id}/approve"),
        Some(&admin),
        None,
    )
    .await;

    let (status, body) = req(&app, "GET", "/api/deals?status=approved", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["company_name"], "Acme");

    let (status, body) = req(&app, "GET", "/api/deals", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn list_rejects_unknown_status() {
    let state = test_state();
    let app = app(&state);
    let token = provisioned_token(&state, "a@x.com", "X").await;

    let (status, _) = req(&app, "GET", "/api/deals?status=pending", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn same_domain_shares_customer_record() {
    let state = test_state();
    let app = app(&state);
    let token = provisioned_token(&state, "a@x.com", "X").await;
    let admin = provisioned_token(&state, ALLOWLISTED_ADMIN, "Ops").await;

    let (_, body) = req(&app, "POST", "/api/deals", Some(&token), Some(acme_payload())).await;
    let first_id = body["deal_id"].as_str().unwrap().to_owned();
    req(
        &app,
        "POST",
        &format!("/api/deals/{first_id}/reject"),
        Some(&admin),
        Some(serde_json::json!({ "reason": "resubmit later" })),
    )
    .await;

    let mut second = acme_payload();
    second["company_name"] = serde_json::json!("Acme Corporation GmbH");
    let (_, body) = req(&app, "POST", "/api/deals", Some(&token), Some(second)).await;
    let second_id = body["deal_id"].as_str().unwrap().to_owned();

    let recs = records(&state);
    let (first, _) = recs.find_deal(&first_id).await.unwrap().unwrap();
    let (second, _) = recs.find_deal(&second_id).await.unwrap().unwrap();
    assert_eq!(first.customer_id, second.customer_id);
}
