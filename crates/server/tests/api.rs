//! HTTP API tests against the in-memory backends.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use nano_config::Settings;
use nano_server::state::demo_customers;
use nano_server::{create_router, AppState};
use nano_store::{
    InMemoryAuditStore, InMemoryConversationStore, InMemoryCustomerStore, InMemorySessionStore,
};

fn app() -> axum::Router {
    let customers = Arc::new(InMemoryCustomerStore::new());
    for customer in demo_customers() {
        customers.insert_customer(customer);
    }
    let state = AppState::new(
        Settings::default(),
        Arc::new(InMemorySessionStore::new()),
        customers,
        Arc::new(InMemoryAuditStore::new()),
        Arc::new(InMemoryConversationStore::new()),
        None,
    );
    create_router(state)
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_chat_creates_session_when_absent() {
    let app = app();

    let response = app
        .oneshot(post_json(
            "/api/chat",
            serde_json::json!({ "message": "Hello!" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["response"].as_str().unwrap().contains("NANO"));
    assert!(!json["session_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_rejects_empty_and_oversized_messages() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json("/api/chat", serde_json::json!({ "message": "  " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let long = "x".repeat(2001);
    let response = app
        .clone()
        .oneshot(post_json("/api/chat", serde_json::json!({ "message": long })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json(
            "/api/chat",
            serde_json::json!({ "message": "hi", "session_id": "not-a-uuid" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_full_verification_over_http() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/sessions",
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let session_id = body_json(response).await["session_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/chat",
            serde_json::json!({ "message": "What is my balance?", "session_id": session_id.clone() }),
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["requires_verification"], true);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/chat",
            serde_json::json!({
                "message": "My name is John Doe and my account number is 1234567890",
                "session_id": session_id.clone()
            }),
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["requires_security_question"], true);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/chat",
            serde_json::json!({ "message": "fluffy", "session_id": session_id.clone() }),
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["verified"], true);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/chat",
            serde_json::json!({ "message": "What is my balance?", "session_id": session_id.clone() }),
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert!(json["response"].as_str().unwrap().contains("$2500.00"));

    // Session metadata now shows the verified binding
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/sessions/{session_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["verified"], true);

    // And the summary reflects the audit trail
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/sessions/{session_id}/summary"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["summary"]["verification_status"], "completed");
}

#[tokio::test]
async fn test_session_lifecycle() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json("/api/sessions", serde_json::json!({})))
        .await
        .unwrap();
    let session_id = body_json(response).await["session_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/sessions/{session_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // A terminated session is refused by the chat endpoint
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/chat",
            serde_json::json!({ "message": "hello", "session_id": session_id.clone() }),
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["requires_new_session"], true);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/sessions/unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_session_metadata_is_404() {
    let app = app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/sessions/does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
