//! Endpoint tests against an in-memory catalog

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::sync::Arc;
use storefront_client::{InMemoryCatalog, StaticBalance};
use storefront_core::{AccountBalance, BalanceInquiry, Config, Money};
use storefront_web::{AppState, build_app};
use tower::ServiceExt;

const BOUNDARY: &str = "storefront-test-boundary";

struct TestApp {
    app: Router,
    catalog: Arc<InMemoryCatalog>,
    balance: Arc<StaticBalance>,
}

fn test_app(catalog: InMemoryCatalog) -> TestApp {
    let catalog = Arc::new(catalog);
    let balance = Arc::new(StaticBalance::new(BalanceInquiry {
        name: "Warung Nieu".to_string(),
        account_infos: vec![AccountBalance {
            balance_type: "Cash".to_string(),
            available_balance: Some(Money {
                value: "130000.00".to_string(),
                currency: "IDR".to_string(),
            }),
            ..AccountBalance::default()
        }],
        ..BalanceInquiry::default()
    }));
    let state = AppState::with_backends(Config::default(), catalog.clone(), balance.clone());

    TestApp {
        app: build_app(state),
        catalog,
        balance,
    }
}

fn multipart_body(fields: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

fn multipart_request(method: &str, uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields)))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn ids(catalog: &Value) -> Vec<u64> {
    catalog["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|product| product["id"].as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn health_check_reports_ok() {
    let test = test_app(InMemoryCatalog::new());
    let (status, body) = send(&test.app, empty_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn refresh_then_list() {
    let test = test_app(InMemoryCatalog::new().with_page_size(10).with_generated(24));

    let (status, body) = send(&test.app, empty_request("POST", "/api/catalog/refresh")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "applied");
    assert_eq!(body["count"], 24);

    let (_, catalog) = send(&test.app, empty_request("GET", "/api/catalog")).await;
    let listed = ids(&catalog);
    assert_eq!(listed.len(), 24);
    assert_eq!(listed[0], 24);
    assert_eq!(catalog["is_loading"], false);
    assert_eq!(catalog["image_base_url"], "http://127.0.0.1:8000/assets/images");
    assert_eq!(catalog["editor"]["mode"], "closed");
}

#[tokio::test]
async fn create_product_returns_notice_and_refreshes() {
    let test = test_app(InMemoryCatalog::new().with_generated(2));

    let (status, body) = send(
        &test.app,
        multipart_request(
            "POST",
            "/api/catalog/products",
            &[("name", "Soto Betawi"), ("description", "Coconut milk soup"), ("price", "28000")],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["notice"]["title"], "Success");
    assert_eq!(body["notice"]["text"], "Product created successfully");
    assert_eq!(body["refreshed"], true);

    let (_, catalog) = send(&test.app, empty_request("GET", "/api/catalog")).await;
    assert_eq!(catalog["products"][0]["name"], "Soto Betawi");
}

#[tokio::test]
async fn validation_error_is_422_with_server_message() {
    let test = test_app(InMemoryCatalog::new());
    test.catalog.fail_next(422, "The image must be a file of type: jpeg, png, jpg, gif.");

    let (status, body) = send(
        &test.app,
        multipart_request("POST", "/api/catalog/products", &[("name", "Kopi"), ("price", "9000")]),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["title"], "Validation Error");
    assert_eq!(body["text"], "The image must be a file of type: jpeg, png, jpg, gif.");
}

#[tokio::test]
async fn delete_requires_confirmation() {
    let test = test_app(InMemoryCatalog::new().with_generated(3));

    let (status, body) =
        send(&test.app, empty_request("DELETE", "/api/catalog/products/2")).await;
    assert_eq!(status, StatusCode::PRECONDITION_REQUIRED);
    assert_eq!(body["title"], "Are you sure?");
    assert_eq!(test.catalog.products().len(), 3);

    let (status, body) = send(
        &test.app,
        empty_request("DELETE", "/api/catalog/products/2?confirm=true"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"]["title"], "Deleted!");

    let (_, catalog) = send(&test.app, empty_request("GET", "/api/catalog")).await;
    assert_eq!(ids(&catalog), vec![3, 1]);
}

#[tokio::test]
async fn delete_unknown_product_is_404() {
    let test = test_app(InMemoryCatalog::new().with_generated(1));

    let (status, body) = send(
        &test.app,
        empty_request("DELETE", "/api/catalog/products/7?confirm=true"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["text"], "Product not found");
}

#[tokio::test]
async fn upstream_failure_is_502_with_generic_text() {
    let test = test_app(InMemoryCatalog::new());
    test.catalog.fail_next(500, "SQLSTATE[HY000]");

    let (status, body) = send(&test.app, empty_request("POST", "/api/catalog/refresh")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["text"], "Failed to fetch products.");

    let (_, catalog) = send(&test.app, empty_request("GET", "/api/catalog")).await;
    assert!(catalog["last_error"].is_string());
}

#[tokio::test]
async fn edit_form_round_trip() {
    let test = test_app(InMemoryCatalog::new().with_generated(2));
    send(&test.app, empty_request("POST", "/api/catalog/refresh")).await;

    let (status, form) = send(&test.app, empty_request("PUT", "/api/catalog/editor/2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(form["name"], "Menu 2");

    let (_, catalog) = send(&test.app, empty_request("GET", "/api/catalog")).await;
    assert_eq!(catalog["editor"]["mode"], "editing");
    assert_eq!(catalog["editor"]["product"]["id"], 2);

    let (status, body) = send(
        &test.app,
        multipart_request(
            "POST",
            "/api/catalog/editor/submit",
            &[("name", "Menu Dua"), ("description", ""), ("price", "5000")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"]["text"], "Product updated successfully");

    let (_, catalog) = send(&test.app, empty_request("GET", "/api/catalog")).await;
    assert_eq!(catalog["editor"]["mode"], "closed");
    assert_eq!(catalog["products"][0]["name"], "Menu Dua");
}

#[tokio::test]
async fn edit_form_for_unlisted_product_is_404() {
    let test = test_app(InMemoryCatalog::new());
    let (status, _) = send(&test.app, empty_request("PUT", "/api/catalog/editor/9")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn balance_board_lifecycle() {
    let test = test_app(InMemoryCatalog::new());

    let (_, view) = send(&test.app, empty_request("GET", "/api/balance")).await;
    assert_eq!(view["state"], "loading");

    let (status, view) = send(&test.app, empty_request("POST", "/api/balance/refresh")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "ready");
    assert_eq!(view["tables"][0]["rows"][0]["label"], "Available Balance");

    test.balance.fail_with(503, "down");
    let (status, body) = send(&test.app, empty_request("POST", "/api/balance/refresh")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["text"], "Failed to fetch balance information.");

    let (_, view) = send(&test.app, empty_request("GET", "/api/balance")).await;
    assert_eq!(view["state"], "failed");
    assert_eq!(view["inquiry"]["name"], "Warung Nieu");
}
