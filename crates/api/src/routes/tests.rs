//! Router tests driven through the full middleware stack.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use chrono::Utc;
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Value};
use tally_db::entities::{accounts, sea_orm_active_enums::AccountType};
use tally_shared::{JwtConfig, JwtService, LedgerConfig};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{AppState, create_router};

fn state(db: DatabaseConnection) -> AppState {
    AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(JwtService::new(JwtConfig {
            secret: "router-test-secret-key-at-least-32-bytes".to_string(),
            access_token_expires_minutes: 15,
        })),
        ledger: Arc::new(LedgerConfig::default()),
    }
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn router_with_token(db: DatabaseConnection, role: &str) -> (Router, String) {
    let state = state(db);
    let token = state
        .jwt_service
        .generate_access_token(Uuid::new_v4(), role)
        .unwrap();
    (create_router(state), token)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn account(code: &str, name: &str, account_type: AccountType) -> accounts::Model {
    let now = Utc::now().into();
    accounts::Model {
        id: Uuid::new_v4(),
        code: code.to_string(),
        name: name.to_string(),
        description: None,
        account_type,
        is_active: true,
        is_cash_equivalent: code == "1001",
        created_at: now,
        updated_at: now,
    }
}

fn totals_row(
    account: &accounts::Model,
    debit: rust_decimal::Decimal,
    credit: rust_decimal::Decimal,
) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([
        ("account_id", Value::from(account.id)),
        ("debit_total", Value::from(debit)),
        ("credit_total", Value::from(credit)),
    ])
}

#[tokio::test]
async fn test_health_is_public() {
    let app = create_router(state(empty_db()));

    let response = app.oneshot(get("/api/v1/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = create_router(state(empty_db()));

    let response = app.oneshot(get("/api/v1/accounts", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "missing_token");
}

#[tokio::test]
async fn test_malformed_token_is_unauthorized() {
    let app = create_router(state(empty_db()));

    let response = app
        .oneshot(get("/api/v1/accounts/trial-balance", Some("not-a-jwt")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "invalid_token");
}

#[tokio::test]
async fn test_viewer_cannot_create_accounts() {
    let (app, token) = router_with_token(empty_db(), "viewer");
    let body = serde_json::json!({ "code": "1001", "name": "Cash on Hand", "type": "asset" });

    let response = app
        .oneshot(post_json("/api/v1/accounts", &token, &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_invalid_account_body_lists_fields() {
    let (app, token) = router_with_token(empty_db(), "admin");
    let body = serde_json::json!({ "code": "", "name": "Cash on Hand", "type": "asset" });

    let response = app
        .oneshot(post_json("/api/v1/accounts", &token, &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "VALIDATION_ERROR");
    assert!(json["fields"]["code"].is_array());
}

#[tokio::test]
async fn test_blank_account_fields_are_rejected() {
    let (app, token) = router_with_token(empty_db(), "admin");
    let body = serde_json::json!({ "code": "   ", "name": "\t ", "type": "asset" });

    let response = app
        .oneshot(post_json("/api/v1/accounts", &token, &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "VALIDATION_ERROR");
    assert!(json["fields"]["code"].is_array());
    assert!(json["fields"]["name"].is_array());
}

#[tokio::test]
async fn test_out_of_range_preview_amounts_are_rejected() {
    let (app, token) = router_with_token(empty_db(), "viewer");
    let body = serde_json::json!({
        "bank_account_id": Uuid::new_v4(),
        "statement_date": "2025-01-31",
        "statement_number": "STMT-2025-01",
        "closing_balance": "0.00001",
        "book_balance": "79228162514264337593543950335",
        "deposits_in_transit": "1",
    });

    let response = app
        .oneshot(post_json("/api/v1/reconciliations/preview", &token, &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["fields"]["book_balance"].is_array());
    assert!(json["fields"]["closing_balance"].is_array());
}

#[tokio::test]
async fn test_negative_bank_charges_are_rejected() {
    let (app, token) = router_with_token(empty_db(), "accountant");
    let body = serde_json::json!({
        "bank_account_id": Uuid::new_v4(),
        "statement_date": "2025-01-31",
        "statement_number": "STMT-2025-01",
        "closing_balance": 50450,
        "bank_charges": -100,
    });

    let response = app
        .oneshot(post_json("/api/v1/reconciliations/preview", &token, &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fields"]["bank_charges"].is_array());
}

#[tokio::test]
async fn test_trial_balance_accepts_camel_case_query() {
    let cash = account("1001", "Cash on Hand", AccountType::Asset);
    let capital = account("3001", "Owner Capital", AccountType::Equity);
    let rent = account("5001", "Rent Expense", AccountType::Expense);
    let retained = account("3100", "Retained Earnings", AccountType::Equity);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            cash.clone(),
            capital.clone(),
            retained.clone(),
            rent.clone(),
        ]])
        .append_query_results([vec![
            totals_row(&cash, dec!(10000), dec!(3000)),
            totals_row(&capital, dec!(0), dec!(10000)),
            totals_row(&rent, dec!(3000), dec!(0)),
        ]])
        .into_connection();
    let (app, token) = router_with_token(db, "viewer");

    let response = app
        .oneshot(get(
            "/api/v1/accounts/trial-balance?asOfDate=2025-01-31&includeZeroBalance=0",
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["as_of_date"], "2025-01-31");
    assert_eq!(json["is_balanced"], true);
    assert_eq!(json["total_debit"], 13000.0);

    let codes: Vec<&str> = json["accounts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|line| line["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["1001", "3001", "5001"]);
}

#[tokio::test]
async fn test_trial_balance_rejects_bad_boolean() {
    let (app, token) = router_with_token(empty_db(), "viewer");

    let response = app
        .oneshot(get(
            "/api/v1/accounts/trial-balance?include_zero_balance=maybe",
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_account_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<accounts::Model>::new()])
        .into_connection();
    let (app, token) = router_with_token(db, "viewer");

    let response = app
        .oneshot(get(
            &format!("/api/v1/accounts/{}/balance", Uuid::new_v4()),
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "NOT_FOUND");
    assert_eq!(json["code"], "ACCOUNT_NOT_FOUND");
}
