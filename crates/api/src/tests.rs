//! Router tests driven through `tower::ServiceExt::oneshot` against an
//! in-memory store.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;
use warden_core::{Engine, MemoryStore, Role};
use warden_shared::{JwtService, LedgerConfig, ReceiptConfig, jwt::JwtConfig};

use crate::{AppState, create_router};

struct TestApp {
    state: AppState,
    dorm_id: Uuid,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let receipts = ReceiptConfig {
            dorm_name: "Acacia Hall".to_string(),
            signature: None,
        };
        let engine = Engine::new(store, &LedgerConfig::default(), &receipts).unwrap();
        let jwt_service = JwtService::new(JwtConfig {
            secret: "router-test-secret".to_string(),
            access_token_expires_minutes: 15,
        });
        Self {
            state: AppState {
                engine: Arc::new(engine),
                jwt_service: Arc::new(jwt_service),
            },
            dorm_id: Uuid::now_v7(),
        }
    }

    fn token(&self, role: Role) -> String {
        self.state
            .jwt_service
            .generate_access_token(Uuid::now_v7(), self.dorm_id, role.as_str())
            .unwrap()
    }

    async fn send(&self, request: Request<Body>) -> Response {
        create_router(self.state.clone()).oneshot(request).await.unwrap()
    }

    async fn get(&self, role: Role, uri: &str) -> Response {
        let request = Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token(role)))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn post(&self, role: Role, uri: &str, body: &Value) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token(role)))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn enroll(&self, name: &str) -> String {
        let response = self
            .post(Role::Admin, "/api/v1/occupants", &json!({ "display_name": name }))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await["id"].as_str().unwrap().to_string()
    }
}

async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/api/v1/health")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["audit_write_failures"], 0);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/api/v1/dashboard")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/api/v1/occupants")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(request).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_record_charge_and_payment_moves_balance() {
    let app = TestApp::new();
    let occupant_id = app.enroll("Liza").await;

    let charge = json!({
        "occupant_id": occupant_id,
        "category": "maintenance_fee",
        "entry_type": "charge",
        "amount": "1500",
    });
    let response = app.post(Role::Admin, "/api/v1/ledger/entries", &charge).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let payment = json!({
        "occupant_id": occupant_id,
        "category": "maintenance_fee",
        "entry_type": "payment",
        "amount": "500",
        "method": "cash",
    });
    let response = app.post(Role::Adviser, "/api/v1/ledger/entries", &payment).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .get(Role::Admin, &format!("/api/v1/occupants/{occupant_id}/report"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = json_body(response).await;
    assert_eq!(decimal(&report["balance"]), dec!(1000));
    assert_eq!(report["is_cleared"], false);

    let response = app.get(Role::Admin, "/api/v1/dashboard").await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats = json_body(response).await;
    assert_eq!(decimal(&stats["collectibles"]), dec!(1000));
    assert_eq!(stats["active_occupants"], 1);
}

#[tokio::test]
async fn test_forbidden_post_renders_error_body() {
    let app = TestApp::new();
    let occupant_id = app.enroll("Marco").await;

    let charge = json!({
        "occupant_id": occupant_id,
        "category": "maintenance_fee",
        "entry_type": "charge",
        "amount": "1500",
    });
    let response = app.post(Role::Treasurer, "/api/v1/ledger/entries", &charge).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["code"], "FORBIDDEN");
    assert!(body["error"].as_str().unwrap().starts_with("forbidden"));
}

#[tokio::test]
async fn test_unknown_category_is_bad_request() {
    let app = TestApp::new();
    let occupant_id = app.enroll("Nina").await;

    let charge = json!({
        "occupant_id": occupant_id,
        "category": "laundry",
        "entry_type": "charge",
        "amount": "20",
    });
    let response = app.post(Role::Admin, "/api/v1/ledger/entries", &charge).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_occupant_cannot_view_dashboard() {
    let app = TestApp::new();
    let response = app.get(Role::Occupant, "/api/v1/dashboard").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_fine_issue_and_void_through_routes() {
    let app = TestApp::new();
    let occupant_id = app.enroll("Oscar").await;

    let fine = json!({
        "occupant_id": occupant_id,
        "pesos": "150",
        "points": 2,
        "note": "Late curfew",
    });
    let response = app.post(Role::StudentAssistant, "/api/v1/fines", &fine).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let issued = json_body(response).await;
    assert_eq!(issued["ledger_synced"], true);
    let fine_id = issued["fine"]["id"].as_str().unwrap().to_string();

    let response = app
        .post(
            Role::StudentAssistant,
            &format!("/api/v1/fines/{fine_id}/void"),
            &json!({ "reason": "wrong occupant" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let voided = json_body(response).await;
    assert_eq!(voided["entries_voided"], 1);

    let response = app
        .get(Role::Admin, &format!("/api/v1/occupants/{occupant_id}/report"))
        .await;
    assert_eq!(decimal(&json_body(response).await["balance"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_override_rejects_value_and_clear_together() {
    let app = TestApp::new();
    let occupant_id = app.enroll("Paolo").await;

    let body = json!({
        "email": "paolo@example.edu",
        "clear_email": true,
        "reason": "records cleanup",
    });
    let response = app
        .post(Role::Admin, &format!("/api/v1/overrides/occupants/{occupant_id}"), &body)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_override_occupant_reports_changed_fields() {
    let app = TestApp::new();
    let occupant_id = app.enroll("Queenie").await;

    let body = json!({ "display_name": "Queenie R.", "reason": "legal name" });
    let response = app
        .post(Role::Admin, &format!("/api/v1/overrides/occupants/{occupant_id}"), &body)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = json_body(response).await;
    assert_eq!(outcome["entity_type"], "occupant");
    assert_eq!(outcome["changed_fields"], json!(["display_name"]));

    let response = app
        .post(Role::Adviser, &format!("/api/v1/overrides/occupants/{occupant_id}"), &body)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_report_renders_csv_sheet() {
    let app = TestApp::new();
    let occupant_id = app.enroll("Rico").await;
    let fine = json!({ "occupant_id": occupant_id, "pesos": "75", "note": "Noise" });
    let response = app.post(Role::Admin, "/api/v1/fines", &fine).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .get(Role::Admin, "/api/v1/reports/fines-ledger?format=csv&sheet=metadata")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/csv"));
    let csv = text_body(response).await;
    assert!(csv.lines().count() > 1);

    let response = app.get(Role::Admin, "/api/v1/reports/fines-ledger").await;
    assert_eq!(response.status(), StatusCode::OK);
    let workbook = json_body(response).await;
    assert_eq!(workbook["report"], "fines-ledger");
}

#[tokio::test]
async fn test_report_rejects_unknown_key_and_format() {
    let app = TestApp::new();

    let response = app.get(Role::Admin, "/api/v1/reports/payroll").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .get(Role::Admin, "/api/v1/reports/fines-ledger?format=xlsx")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .get(Role::Admin, "/api/v1/reports/fines-ledger?format=csv&sheet=Nope")
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_audit_log_is_admin_only() {
    let app = TestApp::new();
    app.enroll("Sofia").await;

    let response = app.get(Role::Admin, "/api/v1/audit?action=occupant.enroll").await;
    assert_eq!(response.status(), StatusCode::OK);
    let events = json_body(response).await;
    assert_eq!(events.as_array().unwrap().len(), 1);

    let response = app.get(Role::Treasurer, "/api/v1/audit").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
