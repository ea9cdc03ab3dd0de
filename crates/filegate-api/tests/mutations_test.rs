//! Owner mutations: metadata update, access, removal, processing and upload completion.

mod helpers;

use filegate_rpc::RemoteError;
use helpers::{auth, setup_test_app};
use serde_json::{json, Value};

#[tokio::test]
async fn test_update_normalizes_tags() {
    let app = setup_test_app().await;
    app.backend.reply("files.update", Ok(json!({}))).await;

    let response = app
        .client()
        .patch("/api/files/update")
        .add_header(auth::HEADER, auth::user("bob", Some("bobby")))
        .json(&json!({
            "data": {
                "id": "u1",
                "attributes": {"meta": {"name": "Chair", "tags": ["Wood", " OAK "]}}
            }
        }))
        .await;

    assert_eq!(response.status_code(), 204);
    assert_eq!(
        app.backend.calls("files.update"),
        vec![json!({
            "uploadId": "u1",
            "meta": {"name": "Chair", "tags": ["wood", "oak"]},
            "username": "bob"
        })]
    );
}

#[tokio::test]
async fn test_update_relays_viewer_settings() {
    let app = setup_test_app().await;
    app.backend.reply("files.update", Ok(json!({}))).await;

    let background = json!({
        "uploadId": "bg1",
        "filename": "bob/bg1/bg.png",
        "username": "bob",
        "contentType": "image/png",
        "contentLength": "512",
        "url": "https://cdn.example.com/bg.png"
    });

    let response = app
        .client()
        .patch("/api/files/update")
        .add_header(auth::HEADER, auth::user("bob", None))
        .json(&json!({
            "data": {
                "id": "u1",
                "attributes": {"meta": {
                    "name": "Chair",
                    "type": "object",
                    "controlsData": [0.1, 0.2],
                    "backgroundImage": background
                }}
            }
        }))
        .await;

    assert_eq!(response.status_code(), 204);
    let sent = app.backend.calls("files.update");
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0]["meta"],
        json!({
            "name": "Chair",
            "type": "object",
            "controlsData": [0.1, 0.2],
            "backgroundImage": background
        })
    );
}

#[tokio::test]
async fn test_update_rejects_invalid_website() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .patch("/api/files/update")
        .add_header(auth::HEADER, auth::user("bob", None))
        .json(&json!({"data": {"id": "u1", "attributes": {"meta": {"website": "not a url"}}}}))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(app.backend.total_calls(), 0);
}

#[tokio::test]
async fn test_update_by_stranger_is_forbidden() {
    let app = setup_test_app().await;
    app.backend
        .reply("files.update", Err(RemoteError::new(403, "not the owner")))
        .await;

    let response = app
        .client()
        .patch("/api/files/update")
        .add_header(auth::HEADER, auth::user("alice", None))
        .json(&json!({"data": {"id": "u1", "attributes": {"meta": {"name": "Mine"}}}}))
        .await;

    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_access_sets_public_flag() {
    let app = setup_test_app().await;
    app.backend.reply("files.access", Ok(json!({}))).await;

    let response = app
        .client()
        .put("/api/files/access")
        .add_header(auth::HEADER, auth::user("bob", None))
        .json(&json!({"data": {"id": "u1", "attributes": {"public": true}}}))
        .await;

    assert_eq!(response.status_code(), 204);
    assert_eq!(
        app.backend.calls("files.access"),
        vec![json!({"filename": "u1", "setPublic": true, "username": "bob"})]
    );
}

#[tokio::test]
async fn test_mutations_require_authentication() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .put("/api/files/access")
        .json(&json!({"data": {"id": "u1", "attributes": {"public": true}}}))
        .await;
    assert_eq!(response.status_code(), 401);

    let response = app.client().delete("/api/files/u1").await;
    assert_eq!(response.status_code(), 401);

    assert_eq!(app.backend.total_calls(), 0);
}

#[tokio::test]
async fn test_remove_scopes_to_owner() {
    let app = setup_test_app().await;
    app.backend.reply("files.remove", Ok(json!({}))).await;

    let response = app
        .client()
        .delete("/api/files/u1")
        .add_header(auth::HEADER, auth::user("bob", None))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(
        app.backend.calls("files.remove"),
        vec![json!({"filename": "u1", "username": "bob"})]
    );
}

#[tokio::test]
async fn test_admin_remove_is_unscoped() {
    let app = setup_test_app().await;
    app.backend.reply("files.remove", Ok(json!({}))).await;

    let response = app
        .client()
        .delete("/api/files/u1")
        .add_header(auth::HEADER, auth::admin("root"))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(app.backend.calls("files.remove"), vec![json!({"filename": "u1"})]);
}

#[tokio::test]
async fn test_process_forwards_export_settings() {
    let app = setup_test_app().await;
    app.backend.reply("files.process", Ok(json!({}))).await;

    let response = app
        .client()
        .post("/api/files/process")
        .add_header(auth::HEADER, auth::user("bob", None))
        .json(&json!({"data": {"id": "u1", "attributes": {"export": {"format": "glb"}}}}))
        .await;

    assert_eq!(response.status_code(), 201);
    assert_eq!(
        app.backend.calls("files.process"),
        vec![json!({"uploadId": "u1", "username": "bob", "export": {"format": "glb"}})]
    );
}

#[tokio::test]
async fn test_process_before_upload_is_precondition_failed() {
    let app = setup_test_app().await;
    app.backend
        .reply("files.process", Err(RemoteError::new(412, "not uploaded")))
        .await;

    let response = app
        .client()
        .post("/api/files/process")
        .add_header(auth::HEADER, auth::user("bob", None))
        .json(&json!({"data": {"id": "u1"}}))
        .await;

    assert_eq!(response.status_code(), 412);
    assert_eq!(
        app.backend.calls("files.process"),
        vec![json!({"uploadId": "u1", "username": "bob"})]
    );
}

#[tokio::test]
async fn test_finish_points_at_the_file() {
    let app = setup_test_app().await;
    app.backend
        .reply("files.finish", Ok(json!({"filename": "u1"})))
        .await;

    let response = app
        .client()
        .post("/api/files/finish")
        .add_header(auth::HEADER, auth::user("bob", None))
        .json(&json!({"data": {"id": "u1/model.bin"}}))
        .await;

    assert_eq!(response.status_code(), 202);
    assert_eq!(
        response.headers()["location"],
        "https://api.example.com/api/files/u1"
    );
    assert_eq!(
        app.backend.calls("files.finish"),
        vec![json!({"id": "u1/model.bin", "username": "bob"})]
    );
}

#[tokio::test]
async fn test_finish_while_processing_is_accepted() {
    let app = setup_test_app().await;
    app.backend
        .reply("files.finish", Err(RemoteError::new(202, "still processing")))
        .await;

    let response = app
        .client()
        .post("/api/files/finish")
        .add_header(auth::HEADER, auth::user("bob", None))
        .json(&json!({"data": {"id": "u1/model.bin"}}))
        .await;

    assert_eq!(response.status_code(), 202);
    let text: Value = response.json();
    assert_eq!(text, json!("202: still processing"));
}

#[tokio::test]
async fn test_finish_with_missing_parts_is_precondition_failed() {
    let app = setup_test_app().await;
    app.backend
        .reply("files.finish", Err(RemoteError::new(412, "parts missing")))
        .await;

    let response = app
        .client()
        .post("/api/files/finish")
        .add_header(auth::HEADER, auth::user("bob", None))
        .json(&json!({"data": {"id": "u1/model.bin"}}))
        .await;

    assert_eq!(response.status_code(), 412);
}
