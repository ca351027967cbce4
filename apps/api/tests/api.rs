//! End-to-end tests driving the router in-process against an in-memory
//! database: register → login → deposit → purchase, plus the gate and
//! ownership failures around that path.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use vendo_api::{build_router, ApiConfig, AppState};
use vendo_db::{Database, DbConfig};

async fn test_app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let config = ApiConfig {
        port: 0,
        database_path: ":memory:".to_string(),
        environment: "test".to_string(),
    };
    build_router(AppState::new(&db, config))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Registers an account and returns a fresh authentication token.
async fn register_and_login(app: &Router, username: &str, role: &str) -> String {
    let (status, _) = send(
        app,
        json_request(
            "POST",
            "/v1/users",
            json!({"username": username, "password": "secret-password", "role": role}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/v1/auth/tokens",
            json!({"username": username, "password": "secret-password"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let token = body["data"]["token"]["token"].as_str().unwrap().to_string();
    assert_eq!(token.len(), 26);
    token
}

#[tokio::test]
async fn healthcheck_reports_available() {
    let app = test_app().await;

    let (status, body) = send(&app, get("/v1/healthcheck", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "available");
    assert_eq!(body["data"]["system_info"]["environment"], "test");
}

#[tokio::test]
async fn registration_validates_and_rejects_duplicates() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/v1/users",
            json!({"username": "", "password": "short", "role": "admin"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["role"], "must be seller or buyer");
    assert_eq!(body["errors"]["username"], "must be provided");

    let payload = json!({"username": "alice", "password": "secret-password", "role": "buyer"});
    let (status, _) = send(&app, json_request("POST", "/v1/users", payload.clone(), None)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, json_request("POST", "/v1/users", payload, None)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"]["username"],
        "a user with this username already exists"
    );
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = test_app().await;
    register_and_login(&app, "alice", "buyer").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/v1/auth/tokens",
            json!({"username": "alice", "password": "wrong-password"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn deposit_requires_authentication_and_a_real_token() {
    let app = test_app().await;

    // Anonymous caller: the capability gate turns it away.
    let (status, _) = send(&app, get("/v1/users/deposit/100", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Malformed token: rejected by shape before any lookup.
    let (status, _) = send(&app, get("/v1/users/deposit/100", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Well-formed but unknown token.
    let fake = "A".repeat(26);
    let (status, _) = send(&app, get("/v1/users/deposit/100", Some(&fake))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deposit_and_reset_flow() {
    let app = test_app().await;
    let token = register_and_login(&app, "alice", "buyer").await;

    let (status, body) = send(&app, get("/v1/users/deposit/100", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["deposit"], 100);

    let (status, body) = send(&app, get("/v1/users/deposit/50", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["deposit"], 150);

    // 25 is not a coin.
    let (status, body) = send(&app, get("/v1/users/deposit/25", Some(&token))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["deposit"].is_string());

    let (status, body) = send(&app, get("/v1/users/deposit/reset", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["deposit"], 0);
}

#[tokio::test]
async fn capability_gates_split_buyers_and_sellers() {
    let app = test_app().await;
    let buyer_token = register_and_login(&app, "buyer1", "buyer").await;
    let seller_token = register_and_login(&app, "seller1", "seller").await;

    // A buyer cannot list products for sale.
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/v1/products",
            json!({"name": "Lemonade", "cost": 100, "amount_available": 20}),
            Some(&buyer_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // A seller cannot deposit coins.
    let (status, _) = send(&app, get("/v1/users/deposit/100", Some(&seller_token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn full_purchase_flow_with_change() {
    let app = test_app().await;
    let seller_token = register_and_login(&app, "seller1", "seller").await;
    let buyer_token = register_and_login(&app, "buyer1", "buyer").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/v1/products",
            json!({"name": "Lemonade", "cost": 100, "amount_available": 20}),
            Some(&seller_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = body["data"]["product"]["id"].as_i64().unwrap();

    // The catalog is public.
    let (status, body) = send(&app, get("/v1/products", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["metadata"]["total_records"], 1);

    // Build a 475 cent balance from coins.
    for coin in [100, 100, 100, 100, 50, 20, 5] {
        let (status, _) = send(
            &app,
            get(&format!("/v1/users/deposit/{coin}"), Some(&buyer_token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(
        &app,
        get(
            &format!("/v1/products/{product_id}/buy/2"),
            Some(&buyer_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["amount_spent"], 200);
    assert_eq!(body["data"]["product"]["name"], "Lemonade");
    assert_eq!(body["data"]["product"]["quantity_purchased"], 2);
    assert_eq!(body["data"]["change"], json!([100, 100, 50, 20, 5]));

    // Inventory moved with the purchase.
    let (status, body) = send(&app, get(&format!("/v1/products/{product_id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["product"]["amount_available"], 18);

    // Overselling what is left fails validation and mutates nothing.
    let (status, body) = send(
        &app,
        get(
            &format!("/v1/products/{product_id}/buy/19"),
            Some(&buyer_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["product"].is_string());
}

#[tokio::test]
async fn ownership_is_enforced_across_sellers() {
    let app = test_app().await;
    let owner_token = register_and_login(&app, "seller1", "seller").await;
    let intruder_token = register_and_login(&app, "seller2", "seller").await;

    let (_, body) = send(
        &app,
        json_request(
            "POST",
            "/v1/products",
            json!({"name": "Lemonade", "cost": 100, "amount_available": 20}),
            Some(&owner_token),
        ),
    )
    .await;
    let product_id = body["data"]["product"]["id"].as_i64().unwrap();

    // The intruder holds products:write, so it passes the capability gate
    // and fails on ownership - with valid fields.
    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            &format!("/v1/products/{product_id}"),
            json!({"name": "Hijacked", "cost": 10, "amount_available": 1}),
            Some(&intruder_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        json_request(
            "DELETE",
            &format!("/v1/products/{product_id}"),
            Value::Null,
            Some(&intruder_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The record is untouched.
    let (status, body) = send(&app, get(&format!("/v1/products/{product_id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["product"]["name"], "Lemonade");
}

#[tokio::test]
async fn missing_product_is_not_found() {
    let app = test_app().await;

    let (status, body) = send(&app, get("/v1/products/424242", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}
