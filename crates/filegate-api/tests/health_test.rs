//! Health and API documentation endpoints.

mod helpers;

use helpers::setup_test_app;
use serde_json::Value;

#[tokio::test]
async fn test_health_check() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_openapi_document_lists_file_routes() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/openapi.json").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert!(body["paths"].get("/api/files").is_some());
    assert!(body["paths"].get("/api/files/gce-pubsub").is_some());
}

#[tokio::test]
async fn test_openapi_documents_hook_bodies_as_json() {
    let app = setup_test_app().await;

    let body: Value = app.client().get("/api/openapi.json").await.json();

    for hook in ["/api/files/gce", "/api/files/gce-pubsub"] {
        let content = &body["paths"][hook]["post"]["requestBody"]["content"];
        assert!(content.get("application/json").is_some(), "{} body undocumented", hook);
    }
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/health")
        .add_header("x-request-id", "req-123")
        .await;

    assert_eq!(response.headers()["x-request-id"], "req-123");
}
