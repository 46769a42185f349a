//! Folder API integration tests.
//!
//! Run with: `cargo test -p mediapanel-api --test folders_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use axum::http::StatusCode;
use helpers::fixtures::png_form;
use helpers::{setup_test_app, setup_test_app_with, TestApp};
use mediapanel_core::MediaSettings;
use serde_json::{json, Value};

async fn create_folder(app: &TestApp, body: Value) -> Value {
    let response = app.client().post("/media/folders").json(&body).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json::<Value>()["data"].clone()
}

#[tokio::test]
async fn test_create_folder_and_read_tree() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/media/folders")
        .json(&json!({ "name": "Holiday Photos" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Folder created successfully");
    assert_eq!(body["data"]["slug"], "holiday-photos");
    let parent_id = body["data"]["id"].as_str().unwrap().to_string();

    create_folder(&app, json!({ "name": "Beach", "parent_id": parent_id })).await;

    app.client()
        .post("/media")
        .add_header("Accept", "application/json")
        .multipart(png_form(40, 40, "sand.png").add_text("folder_id", &parent_id))
        .await;

    let tree = app.client().get("/media/folders").await;
    assert_eq!(tree.status_code(), StatusCode::OK);
    let roots = tree.json::<Value>()["data"].as_array().unwrap().clone();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["name"], "Holiday Photos");
    assert_eq!(roots[0]["media_count"], 1);
    let children = roots[0]["children"].as_array().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0]["slug"], "beach");
    assert_eq!(children[0]["media_count"], 0);
}

#[tokio::test]
async fn test_duplicate_slug_conflicts() {
    let app = setup_test_app().await;
    let parent = create_folder(&app, json!({ "name": "Archive" })).await;

    // Slugs are unique across the whole tree, not per parent.
    let response = app
        .client()
        .post("/media/folders")
        .json(&json!({ "name": "archive", "parent_id": parent["id"] }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("A folder with slug 'archive' already exists"));
}

#[tokio::test]
async fn test_blank_name_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/media/folders")
        .json(&json!({ "name": "" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let missing_parent = app
        .client()
        .post("/media/folders")
        .json(&json!({ "name": "Orphan", "parent_id": "00000000-0000-0000-0000-000000000000" }))
        .await;
    assert_eq!(missing_parent.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rename_and_move_folder() {
    let app = setup_test_app().await;
    let first = create_folder(&app, json!({ "name": "Drafts" })).await;
    let second = create_folder(&app, json!({ "name": "Published" })).await;
    let id = first["id"].as_str().unwrap();

    let response = app
        .client()
        .put(&format!("/media/folders/{}", id))
        .json(&json!({ "name": "Old Drafts", "parent_id": second["id"] }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], "Folder updated successfully");
    assert_eq!(body["data"]["slug"], "old-drafts");
    assert_eq!(body["data"]["parent_id"], second["id"]);

    let back_to_root = app
        .client()
        .put(&format!("/media/folders/{}", id))
        .json(&json!({ "parent_id": null }))
        .await;
    assert_eq!(back_to_root.json::<Value>()["data"]["parent_id"], Value::Null);
}

#[tokio::test]
async fn test_move_into_own_subtree_is_rejected() {
    let app = setup_test_app().await;
    let top = create_folder(&app, json!({ "name": "Top" })).await;
    let child = create_folder(&app, json!({ "name": "Child", "parent_id": top["id"] })).await;

    let response = app
        .client()
        .put(&format!("/media/folders/{}", top["id"].as_str().unwrap()))
        .json(&json!({ "parent_id": child["id"] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let onto_itself = app
        .client()
        .put(&format!("/media/folders/{}", top["id"].as_str().unwrap()))
        .json(&json!({ "parent_id": top["id"] }))
        .await;
    assert_eq!(onto_itself.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_folder_moves_media_to_root() {
    let app = setup_test_app().await;
    let folder = create_folder(&app, json!({ "name": "Temporary" })).await;
    let folder_id = folder["id"].as_str().unwrap();

    let uploaded = app
        .client()
        .post("/media")
        .add_header("Accept", "application/json")
        .multipart(png_form(40, 40, "kept.png").add_text("folder_id", folder_id))
        .await
        .json::<Value>()["data"]
        .clone();
    assert_eq!(uploaded["folder_id"], folder_id);

    let response = app
        .client()
        .delete(&format!("/media/folders/{}", folder_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>()["message"],
        "Folder deleted successfully"
    );

    let media = app
        .client()
        .get(&format!("/media/{}", uploaded["id"].as_str().unwrap()))
        .await;
    assert_eq!(media.json::<Value>()["data"]["folder_id"], Value::Null);

    let again = app
        .client()
        .delete(&format!("/media/folders/{}", folder_id))
        .await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_folders_disabled() {
    let app = setup_test_app_with(MediaSettings {
        folders_enabled: false,
        ..MediaSettings::default()
    })
    .await;

    let response = app.client().get("/media/folders").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["message"], "Folders are disabled");

    let create = app
        .client()
        .post("/media/folders")
        .json(&json!({ "name": "Nope" }))
        .await;
    assert_eq!(create.status_code(), StatusCode::NOT_FOUND);

    // folder_id is ignored on upload when folders are off.
    let uploaded = app
        .client()
        .post("/media")
        .add_header("Accept", "application/json")
        .multipart(
            png_form(20, 20, "flat.png")
                .add_text("folder_id", "00000000-0000-0000-0000-000000000000"),
        )
        .await;
    assert_eq!(uploaded.status_code(), StatusCode::CREATED);
    assert_eq!(uploaded.json::<Value>()["data"]["folder_id"], Value::Null);

    let page = app.client().get("/media").await;
    assert!(!page.text().contains("mediapanel-folder-filter"));
}
