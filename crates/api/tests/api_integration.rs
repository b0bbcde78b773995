//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use domain::CheckoutPolicy;
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::InMemoryOrderStore;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    let state = api::AppState::new(Arc::new(InMemoryOrderStore::new()), CheckoutPolicy::default());
    api::create_app(Arc::new(state), get_metrics_handle())
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Base price 10.00, threshold 8 kg.
async fn create_product(app: &axum::Router, stock_milli: i64) -> i64 {
    let (status, json) = send(
        app,
        "POST",
        "/products",
        Some(json!({
            "name": "Tomatoes",
            "category": "VEGETABLE",
            "base_price": 1000,
            "stock": stock_milli,
            "restock_threshold": 8000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_i64().unwrap()
}

async fn add_line(app: &axum::Router, customer: i64, product_id: i64, milli: i64) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        &format!("/customers/{customer}/cart/lines"),
        Some(json!({ "product_id": product_id, "quantity": milli })),
    )
    .await
}

async fn checkout(app: &axum::Router, customer: i64) -> (StatusCode, Value) {
    let delivery = Utc::now() + Duration::hours(24);
    send(
        app,
        "POST",
        &format!("/customers/{customer}/checkout"),
        Some(json!({ "delivery_date": delivery })),
    )
    .await
}

async fn place_order(app: &axum::Router, customer: i64) -> i64 {
    let product_id = create_product(app, 100_000).await;
    let (status, _) = add_line(app, customer, product_id, 25_000).await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = checkout(app, customer).await;
    assert_eq!(status, StatusCode::CREATED);
    json["order_id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();
    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_product_catalog() {
    let app = setup();
    let id = create_product(&app, 15_000).await;

    let (status, json) = send(&app, "GET", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Tomatoes");
    assert_eq!(json["stock"], 15_000);

    let (status, json) = send(&app, "GET", "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", "/products/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/products",
        Some(json!({
            "name": "Bad",
            "category": "FRUIT",
            "base_price": -1,
            "stock": 0,
            "restock_threshold": 0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cart_checkout_and_delivery_flow() {
    let app = setup();
    let product_id = create_product(&app, 15_000).await;

    let (status, _) = send(
        &app,
        "POST",
        "/coupons",
        Some(json!({
            "code": "FRESH20",
            "discount": 2000,
            "active": true,
            "expires_on": "2099-12-31"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, "POST", "/customers/1/coupons", Some(json!({ "code": "FRESH20" }))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // 10 kg leaves 5 kg, under the 8 kg threshold: surcharged to 20.00
    let (status, json) = add_line(&app, 1, product_id, 10_000).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["unit_price"], 2000);

    let (status, json) = send(&app, "PUT", "/customers/1/cart/coupon", Some(json!({ "code": "FRESH20" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["discount"], 2000);

    let (status, json) = send(&app, "GET", "/customers/1/cart/totals", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["subtotal"], 20_000);
    assert_eq!(json["vat"], 3_240);
    assert_eq!(json["grand_total"], 21_240);

    let (status, json) = checkout(&app, 1).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["totals"]["grand_total"], 21_240);
    let order_id = json["order_id"].as_i64().unwrap();

    let (_, json) = send(&app, "GET", &format!("/orders/{order_id}"), None).await;
    assert_eq!(json["status"], "Pending");
    assert_eq!(json["lines"][0]["unit_price"], 2000);

    let (_, json) = send(&app, "GET", &format!("/products/{product_id}"), None).await;
    assert_eq!(json["stock"], 5_000);

    let (_, json) = send(&app, "GET", "/orders/available", None).await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    let claim = |carrier: i64| json!({ "carrier_id": carrier });
    let (status, json) = send(&app, "POST", &format!("/orders/{order_id}/claim"), Some(claim(7))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["applied"], true);

    let (status, json) = send(&app, "POST", &format!("/orders/{order_id}/claim"), Some(claim(8))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["applied"], false);

    let (_, json) = send(&app, "GET", "/carriers/7/orders", None).await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "POST", &format!("/orders/{order_id}/complete"), Some(claim(8))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&app, "POST", &format!("/orders/{order_id}/complete"), Some(claim(7))).await;
    assert_eq!(status, StatusCode::OK);

    let rate = |score: u8| json!({ "customer_id": 1, "score": score });
    let (status, _) = send(&app, "POST", &format!("/orders/{order_id}/rate"), Some(rate(9))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = send(&app, "POST", &format!("/orders/{order_id}/rate"), Some(rate(4))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "POST", &format!("/orders/{order_id}/rate"), Some(rate(5))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, json) = send(&app, "GET", "/carriers/7/rating", None).await;
    assert_eq!(json["kind"], "rated");
    assert_eq!(json["count"], 1);
    assert_eq!(json["average"], 4.0);

    let (_, json) = send(&app, "GET", "/carriers/7/orders?scope=history", None).await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    let (_, json) = send(&app, "GET", "/customers/1/orders", None).await;
    assert_eq!(json[0]["status"], "Delivered");
}

#[tokio::test]
async fn test_checkout_rejections() {
    let app = setup();

    let (status, _) = checkout(&app, 2).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let product_id = create_product(&app, 100_000).await;
    add_line(&app, 2, product_id, 5_000).await;
    let (status, json) = checkout(&app, 2).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("minimum"));

    let (status, _) = add_line(&app, 2, product_id, 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = add_line(&app, 2, 999, 1_000).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "PUT", "/customers/2/cart/coupon", Some(json!({ "code": "NOPE" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_insufficient_stock_is_conflict() {
    let app = setup();
    let product_id = create_product(&app, 30_000).await;

    add_line(&app, 3, product_id, 25_000).await;
    add_line(&app, 4, product_id, 25_000).await;

    let (status, _) = checkout(&app, 3).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = checkout(&app, 4).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("Insufficient stock"));

    // The losing cart is kept for the customer to adjust
    let (_, json) = send(&app, "GET", "/customers/4/cart", None).await;
    assert_eq!(json["lines"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cancel_rules() {
    let app = setup();
    let order_id = place_order(&app, 5).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/cancel"),
        Some(json!({ "customer_id": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/cancel"),
        Some(json!({ "customer_id": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["transition"], "cancel");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/claim"),
        Some(json!({ "carrier_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_status_listing() {
    let app = setup();
    let first = place_order(&app, 10).await;
    place_order(&app, 11).await;

    send(&app, "POST", &format!("/orders/{first}/claim"), Some(json!({ "carrier_id": 3 }))).await;

    let (status, json) = send(&app, "GET", "/orders?status=Pending", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);

    let (_, json) = send(&app, "GET", "/orders?status=Pending,Selected", None).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    let (_, json) = send(&app, "GET", "/orders?limit=1&offset=1", None).await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", "/orders?status=Shipped", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/orders/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
