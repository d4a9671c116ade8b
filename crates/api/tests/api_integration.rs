//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use chrono::{Duration, Utc};
use identity::{Identity, IdentityProvider, JwtIdentityProvider};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::InMemoryOrderRepository;
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "test-secret-key";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    let state = api::create_state(InMemoryOrderRepository::new());
    let identity: Arc<dyn IdentityProvider> = Arc::new(JwtIdentityProvider::new(SECRET));
    api::create_app(state, identity, get_metrics_handle())
}

fn token() -> String {
    JwtIdentityProvider::new(SECRET)
        .sign(
            &Identity::new("user-1", "tech@lab.test"),
            Utc::now() + Duration::hours(1),
        )
        .unwrap()
}

fn authed(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token()));
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn order_body() -> Value {
    json!({
        "lab": "Central Lab",
        "patient": "Jane Doe",
        "customer": "Clinic 7",
        "services": [
            { "name": "Blood panel", "value": 120.0 },
            { "name": "Urinalysis", "value": 40.0, "status": "DONE" }
        ]
    })
}

async fn create_order(app: &axum::Router) -> String {
    let response = app
        .clone()
        .oneshot(authed("POST", "/orders", Some(order_body())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_orders_require_token() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/orders")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Token not provided");
}

#[tokio::test]
async fn test_malformed_authorization_header() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/orders")
                .header("authorization", "Token abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Token malformatted");
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let app = setup();
    let forged = JwtIdentityProvider::new("another-secret")
        .sign(
            &Identity::new("user-1", "tech@lab.test"),
            Utc::now() + Duration::hours(1),
        )
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/orders")
                .header("authorization", format!("Bearer {forged}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid token");
}

#[tokio::test]
async fn test_create_order() {
    let app = setup();

    let response = app
        .oneshot(authed("POST", "/orders", Some(order_body())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["state"], "CREATED");
    assert_eq!(json["status"], "ACTIVE");
    assert_eq!(json["total_value"], 160.0);
    assert_eq!(json["services"][0]["status"], "PENDING");
    assert_eq!(json["services"][1]["status"], "DONE");
    assert_eq!(json["version"], 1);
}

#[tokio::test]
async fn test_create_order_without_services() {
    let app = setup();
    let mut body = order_body();
    body["services"] = json!([]);

    let response = app
        .oneshot(authed("POST", "/orders", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Order must have at least one service"
    );
}

#[tokio::test]
async fn test_create_order_with_zero_total() {
    let app = setup();
    let mut body = order_body();
    body["services"] = json!([{ "name": "Free check", "value": 0.0 }]);

    let response = app
        .oneshot(authed("POST", "/orders", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_advance_through_workflow() {
    let app = setup();
    let id = create_order(&app).await;
    let uri = format!("/orders/{id}/advance");

    let response = app
        .clone()
        .oneshot(authed("PATCH", &uri, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["state"], "ANALYSIS");

    let response = app
        .clone()
        .oneshot(authed("PATCH", &uri, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["state"], "COMPLETED");

    let response = app.oneshot(authed("PATCH", &uri, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Order cannot advance from state COMPLETED"
    );
}

#[tokio::test]
async fn test_advance_unknown_order() {
    let app = setup();
    let uri = format!("/orders/{}/advance", common::OrderId::new());

    let response = app.oneshot(authed("PATCH", &uri, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_order_id() {
    let app = setup();

    let response = app
        .oneshot(authed("GET", "/orders/not-a-uuid", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_order() {
    let app = setup();
    let id = create_order(&app).await;

    let response = app
        .oneshot(authed("GET", &format!("/orders/{id}"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], id.as_str());
    assert_eq!(json["lab"], "Central Lab");
}

#[tokio::test]
async fn test_list_orders_by_state_and_page() {
    let app = setup();
    let first = create_order(&app).await;
    let second = create_order(&app).await;
    let third = create_order(&app).await;
    app.clone()
        .oneshot(authed("PATCH", &format!("/orders/{second}/advance"), None))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(authed("GET", "/orders?state=CREATED", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let ids: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, [first.as_str(), third.as_str()]);

    let response = app
        .oneshot(authed("GET", "/orders?page=2&limit=2", None))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["id"], third.as_str());
}

#[tokio::test]
async fn test_list_orders_with_unknown_state() {
    let app = setup();

    let response = app
        .oneshot(authed("GET", "/orders?state=ARCHIVED", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("unknown variant"));
}

#[tokio::test]
async fn test_list_orders_with_non_numeric_page() {
    let app = setup();

    let response = app
        .oneshot(authed("GET", "/orders?page=abc", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_create_order_with_service_missing_value() {
    let app = setup();
    let mut body = order_body();
    body["services"] = json!([{ "name": "Hemogram" }]);

    let response = app
        .oneshot(authed("POST", "/orders", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("missing field `value`"));
}

#[tokio::test]
async fn test_create_order_with_unknown_service_status() {
    let app = setup();
    let mut body = order_body();
    body["services"] = json!([{ "name": "Hemogram", "value": 10.0, "status": "FINISHED" }]);

    let response = app
        .oneshot(authed("POST", "/orders", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_add_service_without_value() {
    let app = setup();
    let id = create_order(&app).await;

    let response = app
        .oneshot(authed(
            "POST",
            &format!("/orders/{id}/services"),
            Some(json!({ "name": "Lipid profile" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_add_service() {
    let app = setup();
    let id = create_order(&app).await;

    let response = app
        .oneshot(authed(
            "POST",
            &format!("/orders/{id}/services"),
            Some(json!({ "name": "Lipid profile", "value": 35.5 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["services"].as_array().unwrap().len(), 3);
    assert_eq!(json["services"][2]["name"], "Lipid profile");
    assert_eq!(json["total_value"], 195.5);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    create_order(&app).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
