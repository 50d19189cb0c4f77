//! Handler tests for Users domain
//!
//! Drive the admin router through `mount_resources`, backed by the
//! in-memory repository:
//! - Request bodies (JSON and form)
//! - Status codes, `Location` header, response bodies
//! - Error responses

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use axum_helpers::mount_resources;
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

fn app() -> Router {
    let service = UserService::new(InMemoryUserRepository::new());
    mount_resources([handlers::routes(service)])
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn create(app: &Router, body: Value) -> Response {
    send(app, json_request("POST", "/admin/users", body)).await
}

fn assert_no_internal_fields(value: &Value) {
    assert!(value.get("_id").is_none(), "_id leaked: {}", value);
    assert!(value.get("__v").is_none(), "__v leaked: {}", value);
}

#[tokio::test]
async fn test_create_user_defaults_is_admin_and_sets_location() {
    let app = app();

    let response = create(&app, json!({ "username": "testuser" })).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/users/testuser"
    );

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({ "username": "testuser", "isAdmin": false }));
}

#[tokio::test]
async fn test_create_admin_user() {
    let app = app();

    let response = create(&app, json!({ "username": "admin", "isAdmin": true })).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let user: User = json_body(response.into_body()).await;
    assert!(user.is_admin);
}

#[tokio::test]
async fn test_create_user_location_is_percent_encoded() {
    let app = app();

    let response = create(&app, json!({ "username": "jane doe" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/users/jane%20doe"
    );

    let response = send(&app, empty_request("GET", "/admin/users/jane%20doe")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_user_location_keeps_path_safe_characters() {
    let app = app();

    for (username, location) in [
        ("jd@navy.mil", "/users/jd@navy.mil"),
        ("ops:alpha!", "/users/ops:alpha!"),
        ("o'brien+1", "/users/o'brien+1"),
        ("a/b?c", "/users/a%2Fb%3Fc"),
    ] {
        let response = create(&app, json!({ "username": username })).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), location);
    }

    let response = send(&app, empty_request("GET", "/admin/users/jd@navy.mil")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let user: User = json_body(response.into_body()).await;
    assert_eq!(user.username, "jd@navy.mil");

    let response = send(&app, empty_request("GET", "/admin/users/a%2Fb%3Fc")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_trailing_slash_reaches_the_same_routes() {
    let app = axum_helpers::create_router::<ApiDoc>(app(), &[]).unwrap();

    let response = send(
        &app,
        json_request("POST", "/api/admin/users/", json!({ "username": "testuser" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(&app, empty_request("GET", "/api/admin/users/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Vec<Value> = json_body(response.into_body()).await;
    assert_eq!(body.len(), 1);

    let response = send(&app, empty_request("GET", "/api/admin/users/testuser/")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_user_without_username_returns_400() {
    let app = app();

    let response = create(&app, json!({ "isAdmin": true })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["username"]["path"], "username");
    assert!(!body["username"]["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_duplicate_username_returns_409() {
    let app = app();

    let first = create(&app, json!({ "username": "testuser" })).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = create(&app, json!({ "username": "testuser", "isAdmin": true })).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(
        text_body(second.into_body()).await,
        "Duplicate username detected"
    );
}

#[tokio::test]
async fn test_create_user_ignores_unknown_fields() {
    let app = app();

    let response = create(
        &app,
        json!({ "username": "testuser", "_id": "forged", "__v": 9, "role": "captain" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({ "username": "testuser", "isAdmin": false }));
}

#[tokio::test]
async fn test_create_user_from_form_body() {
    let app = app();

    let request = Request::builder()
        .method("POST")
        .uri("/admin/users")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=formuser&isAdmin=true"))
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let user: User = json_body(response.into_body()).await;
    assert_eq!(user.username, "formuser");
    assert!(user.is_admin);
}

#[tokio::test]
async fn test_create_user_malformed_json_returns_400() {
    let app = app();

    let request = Request::builder()
        .method("POST")
        .uri("/admin/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"username\":"))
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_users() {
    let app = app();

    let response = send(&app, empty_request("GET", "/admin/users")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!([]));

    for name in ["alpha", "bravo", "charlie"] {
        create(&app, json!({ "username": name })).await;
    }

    let response = send(&app, empty_request("GET", "/admin/users")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Vec<Value> = json_body(response.into_body()).await;
    assert_eq!(body.len(), 3);
    body.iter().for_each(assert_no_internal_fields);
}

#[tokio::test]
async fn test_get_user() {
    let app = app();
    create(&app, json!({ "username": "testuser", "isAdmin": true })).await;

    let response = send(&app, empty_request("GET", "/admin/users/testuser")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    assert_no_internal_fields(&body);
    assert_eq!(body, json!({ "username": "testuser", "isAdmin": true }));
}

#[tokio::test]
async fn test_get_unknown_user_returns_empty_404() {
    let app = app();

    let response = send(&app, empty_request("GET", "/admin/users/ghost")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(text_body(response.into_body()).await.is_empty());
}

#[tokio::test]
async fn test_delete_user() {
    let app = app();
    create(&app, json!({ "username": "testuser" })).await;

    let response = send(&app, empty_request("DELETE", "/admin/users/testuser")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    assert_no_internal_fields(&body);
    assert_eq!(body["username"], "testuser");

    let response = send(&app, empty_request("GET", "/admin/users/testuser")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_unknown_user_returns_404() {
    let app = app();

    let response = send(&app, empty_request("DELETE", "/admin/users/ghost")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_user_sets_admin() {
    let app = app();
    create(&app, json!({ "username": "testuser" })).await;

    let response = send(
        &app,
        json_request("PATCH", "/admin/users/testuser", json!({ "isAdmin": true })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    assert_no_internal_fields(&body);
    assert_eq!(body, json!({ "username": "testuser", "isAdmin": true }));

    let response = send(&app, empty_request("GET", "/admin/users/testuser")).await;
    let user: User = json_body(response.into_body()).await;
    assert!(user.is_admin);
}

#[tokio::test]
async fn test_patch_unknown_user_returns_404() {
    let app = app();

    let response = send(
        &app,
        json_request("PATCH", "/admin/users/ghost", json!({ "isAdmin": true })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_validation_failure_returns_500() {
    let app = app();
    create(&app, json!({ "username": "testuser" })).await;

    let response = send(
        &app,
        json_request("PATCH", "/admin/users/testuser", json!({ "isAdmin": null })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        text_body(response.into_body()).await,
        "User validation failed: isAdmin: Path `isAdmin` is required."
    );
}

#[tokio::test]
async fn test_patch_rename_to_taken_username_returns_500() {
    let app = app();
    create(&app, json!({ "username": "alpha" })).await;
    create(&app, json!({ "username": "bravo" })).await;

    let response = send(
        &app,
        json_request("PATCH", "/admin/users/bravo", json!({ "username": "alpha" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = send(&app, empty_request("GET", "/admin/users/bravo")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_public_group_is_not_mounted() {
    let app = app();

    let response = send(&app, empty_request("GET", "/users")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_creates_admit_exactly_one() {
    let app = app();

    let requests = (0..10).map(|_| {
        let app = app.clone();
        tokio::spawn(async move {
            app.oneshot(json_request(
                "POST",
                "/admin/users",
                json!({ "username": "racer" }),
            ))
            .await
            .unwrap()
            .status()
        })
    });

    let mut statuses = Vec::new();
    for handle in requests.collect::<Vec<_>>() {
        statuses.push(handle.await.unwrap());
    }

    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::CREATED).count(),
        1
    );
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count(),
        9
    );
}
