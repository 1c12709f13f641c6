//! # Integration Tests for comreg-api
//!
//! Drives the full router through `tower::ServiceExt::oneshot`: role-based
//! authorization per route, CLIENT visibility scoping, license status
//! derivation at write time, remittance defaults, audit trail recording,
//! and dashboard aggregation.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use comreg_api::state::{AppConfig, AppState};

const SECRET: &str = "test-secret";

/// Helper: build the test app with auth disabled (every caller is admin).
fn test_app() -> axum::Router {
    comreg_api::app(AppState::new())
}

/// Helper: build the test app with auth enabled.
fn test_app_with_auth() -> axum::Router {
    let config = AppConfig {
        port: 8080,
        auth_token: Some(SECRET.to_string()),
    };
    comreg_api::app(AppState::with_config(config, None))
}

/// Bearer token for an admin caller with a user id.
fn admin_token() -> String {
    format!("Bearer admin:00000000-0000-0000-0000-00000000aaaa::{SECRET}")
}

/// Bearer token for a compliance officer caller.
fn officer_token() -> String {
    format!("Bearer compliance_officer:00000000-0000-0000-0000-00000000bbbb::{SECRET}")
}

/// Bearer token for a client affiliated with the given company.
fn client_token(company_id: &str) -> String {
    format!("Bearer client::{company_id}:{SECRET}")
}

/// Bearer token for a client with no company affiliation.
fn unaffiliated_client_token() -> String {
    format!("Bearer client:::{SECRET}")
}

/// Helper: send a request with optional auth header and JSON body.
async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> axum::http::Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = auth {
        builder = builder.header("Authorization", token);
    }
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

/// Helper: read a response body as JSON.
async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Helper: date string `days` from today, in the `YYYY-MM-DD` format the
/// API accepts.
fn date_in(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days)).to_string()
}

/// Helper: create a company as admin and return its id.
async fn create_company(app: &axum::Router, auth: &str, name: &str) -> String {
    let response = send(
        app,
        Method::POST,
        "/v1/companies",
        Some(auth),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

/// Helper: create a license and return the response body.
async fn create_license(
    app: &axum::Router,
    auth: &str,
    company_id: &str,
    license_type: &str,
    expiration: &str,
) -> Value {
    let response = send(
        app,
        Method::POST,
        "/v1/licenses",
        Some(auth),
        Some(json!({
            "company_id": company_id,
            "license_type": license_type,
            "issuing_body": "Central Bank",
            "issue_date": date_in(-365),
            "expiration_date": expiration,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let app = test_app();
    let response = send(&app, Method::GET, "/health/liveness", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_probe_requires_no_auth() {
    let app = test_app_with_auth();
    let response = send(&app, Method::GET, "/health/readiness", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Authentication Gate ------------------------------------------------------

#[tokio::test]
async fn test_unauthenticated_requests_rejected() {
    let app = test_app_with_auth();
    for uri in [
        "/v1/companies",
        "/v1/licenses",
        "/v1/remittances",
        "/v1/dashboard/stats",
        "/v1/audit",
    ] {
        let response = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri: {uri}");
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn test_invalid_token_rejected_on_api_route() {
    let app = test_app_with_auth();
    let response = send(
        &app,
        Method::GET,
        "/v1/companies",
        Some("Bearer admin:::wrong-secret"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// -- Companies ----------------------------------------------------------------

#[tokio::test]
async fn test_create_and_list_companies_sorted_by_name() {
    let app = test_app_with_auth();
    create_company(&app, &admin_token(), "Zenith Holdings").await;
    create_company(&app, &admin_token(), "Acme Transfers Ltd").await;

    let response = send(&app, Method::GET, "/v1/companies", Some(&officer_token()), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Acme Transfers Ltd", "Zenith Holdings"]);
}

#[tokio::test]
async fn test_company_create_requires_admin() {
    let app = test_app_with_auth();
    for token in [officer_token(), unaffiliated_client_token()] {
        let response = send(
            &app,
            Method::POST,
            "/v1/companies",
            Some(&token),
            Some(json!({ "name": "Acme Transfers Ltd" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn test_company_duplicate_name_conflict() {
    let app = test_app_with_auth();
    create_company(&app, &admin_token(), "Acme Transfers Ltd").await;

    let response = send(
        &app,
        Method::POST,
        "/v1/companies",
        Some(&admin_token()),
        Some(json!({ "name": "Acme Transfers Ltd" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_company_empty_name_is_validation_error() {
    let app = test_app_with_auth();
    let response = send(
        &app,
        Method::POST,
        "/v1/companies",
        Some(&admin_token()),
        Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_company_missing_name_is_bad_request() {
    let app = test_app_with_auth();
    let response = send(
        &app,
        Method::POST,
        "/v1/companies",
        Some(&admin_token()),
        Some(json!({ "description": "no name" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- Licenses: status derivation ----------------------------------------------

#[tokio::test]
async fn test_license_expiring_in_15_days_is_pending_renewal() {
    let app = test_app_with_auth();
    let company = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;

    let license = create_license(
        &app,
        &officer_token(),
        &company,
        "Money Transfer License",
        &date_in(15),
    )
    .await;
    assert_eq!(license["status"], "PENDING_RENEWAL");
}

#[tokio::test]
async fn test_license_status_boundaries() {
    let app = test_app_with_auth();
    let company = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;

    let active = create_license(&app, &officer_token(), &company, "A", &date_in(31)).await;
    assert_eq!(active["status"], "ACTIVE");

    let window_edge = create_license(&app, &officer_token(), &company, "B", &date_in(30)).await;
    assert_eq!(window_edge["status"], "PENDING_RENEWAL");

    let today = create_license(&app, &officer_token(), &company, "C", &date_in(0)).await;
    assert_eq!(today["status"], "PENDING_RENEWAL");

    let expired = create_license(&app, &officer_token(), &company, "D", &date_in(-1)).await;
    assert_eq!(expired["status"], "EXPIRED");
}

#[tokio::test]
async fn test_license_caller_supplied_status_is_ignored() {
    let app = test_app_with_auth();
    let company = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;

    let response = send(
        &app,
        Method::POST,
        "/v1/licenses",
        Some(&officer_token()),
        Some(json!({
            "company_id": company,
            "license_type": "Money Transfer License",
            "issuing_body": "Central Bank",
            "issue_date": date_in(-365),
            "expiration_date": date_in(10),
            // Must be dropped: status is derived, never caller-set.
            "status": "ACTIVE",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let license = body_json(response).await;
    assert_eq!(license["status"], "PENDING_RENEWAL");
}

#[tokio::test]
async fn test_license_update_rederives_status() {
    let app = test_app_with_auth();
    let company = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;
    let license = create_license(&app, &officer_token(), &company, "MTL", &date_in(60)).await;
    assert_eq!(license["status"], "ACTIVE");
    let id = license["id"].as_str().unwrap();

    // Pushing the expiration into the past flips the status to EXPIRED.
    let response = send(
        &app,
        Method::PUT,
        &format!("/v1/licenses/{id}"),
        Some(&officer_token()),
        Some(json!({
            "company_id": company,
            "license_type": "MTL",
            "issuing_body": "Central Bank",
            "issue_date": date_in(-365),
            "expiration_date": date_in(-10),
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["status"], "EXPIRED");

    // Editing the expiration forward moves it back to ACTIVE — the state
    // machine has no forward-only constraint.
    let response = send(
        &app,
        Method::PUT,
        &format!("/v1/licenses/{id}"),
        Some(&officer_token()),
        Some(json!({
            "company_id": company,
            "license_type": "MTL",
            "issuing_body": "Central Bank",
            "issue_date": date_in(-365),
            "expiration_date": date_in(90),
        })),
    )
    .await;
    let updated = body_json(response).await;
    assert_eq!(updated["status"], "ACTIVE");
}

// -- Licenses: authorization & validation -------------------------------------

#[tokio::test]
async fn test_license_create_requires_edit_role() {
    let app = test_app_with_auth();
    let company = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;

    let response = send(
        &app,
        Method::POST,
        "/v1/licenses",
        Some(&client_token(&company)),
        Some(json!({
            "company_id": company,
            "license_type": "MTL",
            "issuing_body": "Central Bank",
            "issue_date": date_in(-365),
            "expiration_date": date_in(60),
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_license_create_unknown_company_is_validation_error() {
    let app = test_app_with_auth();
    let response = send(
        &app,
        Method::POST,
        "/v1/licenses",
        Some(&officer_token()),
        Some(json!({
            "company_id": "00000000-0000-0000-0000-000000000000",
            "license_type": "MTL",
            "issuing_body": "Central Bank",
            "issue_date": date_in(-365),
            "expiration_date": date_in(60),
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_license_create_empty_type_is_validation_error() {
    let app = test_app_with_auth();
    let company = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;
    let response = send(
        &app,
        Method::POST,
        "/v1/licenses",
        Some(&officer_token()),
        Some(json!({
            "company_id": company,
            "license_type": "",
            "issuing_body": "Central Bank",
            "issue_date": date_in(-365),
            "expiration_date": date_in(60),
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_license_update_missing_id_is_not_found() {
    let app = test_app_with_auth();
    let company = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;
    let response = send(
        &app,
        Method::PUT,
        "/v1/licenses/00000000-0000-0000-0000-000000000001",
        Some(&officer_token()),
        Some(json!({
            "company_id": company,
            "license_type": "MTL",
            "issuing_body": "Central Bank",
            "issue_date": date_in(-365),
            "expiration_date": date_in(60),
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_license_delete_requires_admin() {
    let app = test_app_with_auth();
    let company = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;
    let license = create_license(&app, &officer_token(), &company, "MTL", &date_in(60)).await;
    let id = license["id"].as_str().unwrap();

    let response = send(
        &app,
        Method::DELETE,
        &format!("/v1/licenses/{id}"),
        Some(&officer_token()),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        Method::DELETE,
        &format!("/v1/licenses/{id}"),
        Some(&admin_token()),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Deleted license no longer listed.
    let response = send(&app, Method::GET, "/v1/licenses", Some(&admin_token()), None).await;
    let body = body_json(response).await;
    assert!(body.as_array().unwrap().is_empty());
}

// -- Licenses: listing, ordering, filtering -----------------------------------

#[tokio::test]
async fn test_license_list_ordered_by_expiration_ascending() {
    let app = test_app_with_auth();
    let company = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;
    create_license(&app, &officer_token(), &company, "Late", &date_in(90)).await;
    create_license(&app, &officer_token(), &company, "Soon", &date_in(5)).await;
    create_license(&app, &officer_token(), &company, "Mid", &date_in(45)).await;

    let response = send(&app, Method::GET, "/v1/licenses", Some(&officer_token()), None).await;
    let body = body_json(response).await;
    let types: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["license_type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["Soon", "Mid", "Late"]);
}

#[tokio::test]
async fn test_license_list_filters_by_status_and_company() {
    let app = test_app_with_auth();
    let acme = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;
    let zenith = create_company(&app, &admin_token(), "Zenith Holdings").await;
    create_license(&app, &officer_token(), &acme, "Acme Active", &date_in(90)).await;
    create_license(&app, &officer_token(), &acme, "Acme Expired", &date_in(-5)).await;
    create_license(&app, &officer_token(), &zenith, "Zenith Active", &date_in(90)).await;

    let response = send(
        &app,
        Method::GET,
        "/v1/licenses?status=EXPIRED",
        Some(&officer_token()),
        None,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["license_type"], "Acme Expired");

    let response = send(
        &app,
        Method::GET,
        &format!("/v1/licenses?company_id={zenith}&status=ACTIVE"),
        Some(&officer_token()),
        None,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["license_type"], "Zenith Active");
}

// -- CLIENT visibility scoping ------------------------------------------------

#[tokio::test]
async fn test_client_sees_only_own_company_records() {
    let app = test_app_with_auth();
    let acme = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;
    let zenith = create_company(&app, &admin_token(), "Zenith Holdings").await;
    create_license(&app, &officer_token(), &acme, "Acme MTL", &date_in(60)).await;
    create_license(&app, &officer_token(), &zenith, "Zenith MTL", &date_in(60)).await;

    let response = send(
        &app,
        Method::GET,
        "/v1/licenses",
        Some(&client_token(&acme)),
        None,
    )
    .await;
    let body = body_json(response).await;
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["company_id"].as_str().unwrap(), acme);
}

#[tokio::test]
async fn test_client_explicit_company_filter_cannot_widen_scope() {
    let app = test_app_with_auth();
    let acme = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;
    let zenith = create_company(&app, &admin_token(), "Zenith Holdings").await;
    create_license(&app, &officer_token(), &zenith, "Zenith MTL", &date_in(60)).await;

    // A client asking for another company's records still only gets their own.
    let response = send(
        &app,
        Method::GET,
        &format!("/v1/licenses?company_id={zenith}"),
        Some(&client_token(&acme)),
        None,
    )
    .await;
    let body = body_json(response).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unaffiliated_client_sees_empty_lists() {
    let app = test_app_with_auth();
    let acme = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;
    create_license(&app, &officer_token(), &acme, "Acme MTL", &date_in(60)).await;

    for uri in ["/v1/licenses", "/v1/remittances"] {
        let response = send(
            &app,
            Method::GET,
            uri,
            Some(&unaffiliated_client_token()),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body.as_array().unwrap().is_empty(), "uri: {uri}");
    }
}

// -- Remittances --------------------------------------------------------------

#[tokio::test]
async fn test_remittance_status_defaults_to_pending() {
    let app = test_app_with_auth();
    let company = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;

    let response = send(
        &app,
        Method::POST,
        "/v1/remittances",
        Some(&officer_token()),
        Some(json!({
            "company_id": company,
            "remittance_type": "PAYE",
            "period": "March 2026",
            "month": 3,
            "year": 2026,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "PENDING");
}

#[tokio::test]
async fn test_remittance_caller_may_set_status() {
    let app = test_app_with_auth();
    let company = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;

    let response = send(
        &app,
        Method::POST,
        "/v1/remittances",
        Some(&officer_token()),
        Some(json!({
            "company_id": company,
            "remittance_type": "PAYE",
            "period": "March 2026",
            "month": 3,
            "year": 2026,
            "status": "SUBMITTED",
            "amount": 125000.50,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "SUBMITTED");
}

#[tokio::test]
async fn test_remittance_month_out_of_range_is_validation_error() {
    let app = test_app_with_auth();
    let company = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;

    let response = send(
        &app,
        Method::POST,
        "/v1/remittances",
        Some(&officer_token()),
        Some(json!({
            "company_id": company,
            "remittance_type": "PAYE",
            "period": "Month 13",
            "month": 13,
            "year": 2026,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_remittance_list_ordered_and_filtered() {
    let app = test_app_with_auth();
    let company = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;

    for (month, year, period) in [(1, 2026, "Jan 2026"), (12, 2025, "Dec 2025"), (3, 2026, "Mar 2026")] {
        let response = send(
            &app,
            Method::POST,
            "/v1/remittances",
            Some(&officer_token()),
            Some(json!({
                "company_id": company,
                "remittance_type": "PAYE",
                "period": period,
                "month": month,
                "year": year,
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // Ordered year descending, then month descending.
    let response = send(&app, Method::GET, "/v1/remittances", Some(&officer_token()), None).await;
    let body = body_json(response).await;
    let periods: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["period"].as_str().unwrap())
        .collect();
    assert_eq!(periods, vec!["Mar 2026", "Jan 2026", "Dec 2025"]);

    // Year + month filters combine with AND.
    let response = send(
        &app,
        Method::GET,
        "/v1/remittances?year=2026&month=1",
        Some(&officer_token()),
        None,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["period"], "Jan 2026");
}

#[tokio::test]
async fn test_remittance_update_and_delete() {
    let app = test_app_with_auth();
    let company = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;

    let response = send(
        &app,
        Method::POST,
        "/v1/remittances",
        Some(&officer_token()),
        Some(json!({
            "company_id": company,
            "remittance_type": "PAYE",
            "period": "March 2026",
            "month": 3,
            "year": 2026,
        })),
    )
    .await;
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = send(
        &app,
        Method::PUT,
        &format!("/v1/remittances/{id}"),
        Some(&officer_token()),
        Some(json!({
            "company_id": company,
            "remittance_type": "PAYE",
            "period": "March 2026",
            "month": 3,
            "year": 2026,
            "status": "VERIFIED",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "VERIFIED");

    let response = send(
        &app,
        Method::DELETE,
        &format!("/v1/remittances/{id}"),
        Some(&admin_token()),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app,
        Method::DELETE,
        &format!("/v1/remittances/{id}"),
        Some(&admin_token()),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Audit Trail --------------------------------------------------------------

#[tokio::test]
async fn test_every_mutation_writes_exactly_one_audit_entry() {
    let app = test_app_with_auth();
    let company = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;
    let license = create_license(
        &app,
        &officer_token(),
        &company,
        "Money Transfer License",
        &date_in(60),
    )
    .await;
    let id = license["id"].as_str().unwrap();

    send(
        &app,
        Method::PUT,
        &format!("/v1/licenses/{id}"),
        Some(&officer_token()),
        Some(json!({
            "company_id": company,
            "license_type": "Money Transfer License",
            "issuing_body": "Central Bank",
            "issue_date": date_in(-365),
            "expiration_date": date_in(45),
        })),
    )
    .await;

    send(
        &app,
        Method::DELETE,
        &format!("/v1/licenses/{id}"),
        Some(&admin_token()),
        None,
    )
    .await;

    let response = send(&app, Method::GET, "/v1/audit", Some(&admin_token()), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let entries = body.as_array().unwrap();
    // One entry per mutation: company create, license create/update/delete.
    assert_eq!(entries.len(), 4);

    // Newest first: delete, update, create, company create.
    assert_eq!(entries[0]["action"], "DELETE");
    assert_eq!(entries[1]["action"], "UPDATE");
    assert_eq!(entries[2]["action"], "CREATE");
    assert_eq!(entries[3]["action"], "CREATE");

    // Details embed the entity's distinguishing field and the company name.
    for entry in &entries[..3] {
        assert_eq!(entry["entity_type"], "License");
        let details = entry["details"].as_str().unwrap();
        assert!(details.contains("Money Transfer License"), "{details}");
        assert!(details.contains("Acme Transfers Ltd"), "{details}");
    }
    assert_eq!(entries[3]["entity_type"], "Company");
    assert!(entries[3]["details"]
        .as_str()
        .unwrap()
        .contains("Acme Transfers Ltd"));
}

#[tokio::test]
async fn test_deleting_missing_license_writes_no_audit_entry() {
    let app = test_app_with_auth();

    let response = send(
        &app,
        Method::DELETE,
        "/v1/licenses/00000000-0000-0000-0000-000000000002",
        Some(&admin_token()),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, Method::GET, "/v1/audit", Some(&admin_token()), None).await;
    let body = body_json(response).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_audit_trail_filters() {
    let app = test_app_with_auth();
    let company = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;
    create_license(&app, &officer_token(), &company, "MTL", &date_in(60)).await;

    let response = send(
        &app,
        Method::GET,
        "/v1/audit?entity_type=License",
        Some(&officer_token()),
        None,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["entity_type"], "License");

    let response = send(
        &app,
        Method::GET,
        "/v1/audit?action=CREATE&entity_type=Company",
        Some(&officer_token()),
        None,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["entity_type"], "Company");
}

#[tokio::test]
async fn test_audit_trail_denied_to_clients() {
    let app = test_app_with_auth();
    let company = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;

    let response = send(
        &app,
        Method::GET,
        "/v1/audit",
        Some(&client_token(&company)),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_audit_actor_is_recorded() {
    let app = test_app_with_auth();
    create_company(&app, &admin_token(), "Acme Transfers Ltd").await;

    let response = send(&app, Method::GET, "/v1/audit", Some(&admin_token()), None).await;
    let body = body_json(response).await;
    assert_eq!(
        body[0]["actor"].as_str().unwrap(),
        "00000000-0000-0000-0000-00000000aaaa"
    );
}

// -- Dashboard ----------------------------------------------------------------

#[tokio::test]
async fn test_dashboard_counts_and_upcoming_expiries() {
    let app = test_app_with_auth();
    let acme = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;
    let zenith = create_company(&app, &admin_token(), "Zenith Holdings").await;

    create_license(&app, &officer_token(), &acme, "Acme Active", &date_in(60)).await;
    create_license(&app, &officer_token(), &acme, "Acme Due", &date_in(10)).await;
    create_license(&app, &officer_token(), &zenith, "Zenith Expired", &date_in(-5)).await;

    for (status, period) in [("PENDING", "Jan 2026"), ("VERIFIED", "Feb 2026")] {
        send(
            &app,
            Method::POST,
            "/v1/remittances",
            Some(&officer_token()),
            Some(json!({
                "company_id": acme,
                "remittance_type": "PAYE",
                "period": period,
                "month": 1,
                "year": 2026,
                "status": status,
            })),
        )
        .await;
    }

    let response = send(
        &app,
        Method::GET,
        "/v1/dashboard/stats",
        Some(&admin_token()),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await;

    assert_eq!(stats["licenses"]["active"], 1);
    assert_eq!(stats["licenses"]["pending_renewal"], 1);
    assert_eq!(stats["licenses"]["expired"], 1);
    assert_eq!(stats["licenses"]["total"], 3);

    assert_eq!(stats["remittances"]["pending"], 1);
    assert_eq!(stats["remittances"]["verified"], 1);
    assert_eq!(stats["remittances"]["submitted"], 0);
    assert_eq!(stats["remittances"]["total"], 2);

    // Only the license inside [today, today+30] qualifies; the expired one
    // is in the past and the active one is beyond the window.
    let upcoming = stats["upcoming_expiries"].as_array().unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0]["license_type"], "Acme Due");
    assert_eq!(upcoming[0]["company_name"], "Acme Transfers Ltd");
    assert_eq!(upcoming[0]["days_until_expiry"], 10);
}

#[tokio::test]
async fn test_dashboard_scoped_for_client() {
    let app = test_app_with_auth();
    let acme = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;
    let zenith = create_company(&app, &admin_token(), "Zenith Holdings").await;

    create_license(&app, &officer_token(), &acme, "Acme Due", &date_in(10)).await;
    create_license(&app, &officer_token(), &zenith, "Zenith Due", &date_in(5)).await;

    let response = send(
        &app,
        Method::GET,
        "/v1/dashboard/stats",
        Some(&client_token(&acme)),
        None,
    )
    .await;
    let stats = body_json(response).await;
    assert_eq!(stats["licenses"]["total"], 1);
    let upcoming = stats["upcoming_expiries"].as_array().unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0]["license_type"], "Acme Due");
}

#[tokio::test]
async fn test_dashboard_empty_for_unaffiliated_client() {
    let app = test_app_with_auth();
    let acme = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;
    create_license(&app, &officer_token(), &acme, "Acme Due", &date_in(10)).await;

    let response = send(
        &app,
        Method::GET,
        "/v1/dashboard/stats",
        Some(&unaffiliated_client_token()),
        None,
    )
    .await;
    let stats = body_json(response).await;
    assert_eq!(stats["licenses"]["total"], 0);
    assert_eq!(stats["remittances"]["total"], 0);
    assert!(stats["upcoming_expiries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_dashboard_upcoming_expiries_capped_at_ten() {
    let app = test_app_with_auth();
    let company = create_company(&app, &admin_token(), "Acme Transfers Ltd").await;

    for i in 0..12 {
        create_license(
            &app,
            &officer_token(),
            &company,
            &format!("License {i}"),
            &date_in(2 + i),
        )
        .await;
    }

    let response = send(
        &app,
        Method::GET,
        "/v1/dashboard/stats",
        Some(&admin_token()),
        None,
    )
    .await;
    let stats = body_json(response).await;
    let upcoming = stats["upcoming_expiries"].as_array().unwrap();
    assert_eq!(upcoming.len(), 10);
    // Soonest first.
    assert_eq!(upcoming[0]["license_type"], "License 0");
    assert_eq!(upcoming[9]["license_type"], "License 9");
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_spec_served() {
    let app = test_app();
    let response = send(&app, Method::GET, "/openapi.json", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let spec = body_json(response).await;
    assert!(spec["paths"]["/v1/licenses"].is_object());
    assert!(spec["paths"]["/v1/dashboard/stats"].is_object());
}
