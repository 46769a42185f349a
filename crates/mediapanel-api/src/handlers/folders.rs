//! Folder management. Every endpoint answers 404 while folders are disabled.

use crate::api_doc::{FolderEnvelope, FolderTreeEnvelope, MessageEnvelope};
use crate::error::{FailureContext, HttpAppError, ValidatedJson, ValidatedPath};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use mediapanel_core::models::{
    ApiEnvelope, CreateFolderRequest, Folder, FolderTreeNode, UpdateFolderRequest,
};
use mediapanel_core::AppError;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

fn ensure_enabled(state: &AppState) -> Result<(), HttpAppError> {
    if state.media.settings.folders_enabled {
        Ok(())
    } else {
        Err(AppError::NotFound("Folders are disabled".to_string()).into())
    }
}

#[utoipa::path(
    get,
    path = "/media/folders",
    tag = "folders",
    responses(
        (status = 200, description = "Folder tree with media counts", body = FolderTreeEnvelope),
        (status = 404, description = "Folders are disabled", body = MessageEnvelope)
    )
)]
pub async fn index(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiEnvelope<Vec<FolderTreeNode>>>, HttpAppError> {
    ensure_enabled(&state)?;

    let tree = state
        .db
        .folder_repository
        .tree()
        .await
        .failed("Failed to fetch folders")?;

    Ok(Json(ApiEnvelope::ok(tree)))
}

#[utoipa::path(
    post,
    path = "/media/folders",
    tag = "folders",
    request_body = CreateFolderRequest,
    responses(
        (status = 201, description = "Folder created successfully", body = FolderEnvelope),
        (status = 400, description = "Invalid name", body = MessageEnvelope),
        (status = 404, description = "Parent folder not found", body = MessageEnvelope),
        (status = 409, description = "Slug already taken", body = MessageEnvelope)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "create_folder"))]
pub async fn store(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateFolderRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ensure_enabled(&state)?;
    request
        .validate()
        .map_err(AppError::from)
        .failed("Folder creation failed")?;

    let folder = state
        .db
        .folder_repository
        .create(request)
        .await
        .failed("Folder creation failed")?;

    tracing::info!(folder_id = %folder.id, slug = %folder.slug, "Folder created");

    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::ok_with_message("Folder created successfully", folder)),
    ))
}

#[utoipa::path(
    put,
    path = "/media/folders/{id}",
    tag = "folders",
    params(("id" = Uuid, Path, description = "Folder ID")),
    request_body = UpdateFolderRequest,
    responses(
        (status = 200, description = "Folder updated successfully", body = FolderEnvelope),
        (status = 400, description = "Invalid name or move into own subtree", body = MessageEnvelope),
        (status = 404, description = "Folder not found", body = MessageEnvelope),
        (status = 409, description = "Slug already taken", body = MessageEnvelope)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "update_folder", folder_id = %id))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    ValidatedPath(id): ValidatedPath<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateFolderRequest>,
) -> Result<Json<ApiEnvelope<Folder>>, HttpAppError> {
    ensure_enabled(&state)?;
    request
        .validate()
        .map_err(AppError::from)
        .failed("Folder update failed")?;

    let folder = state
        .db
        .folder_repository
        .update(id, request)
        .await
        .failed("Folder update failed")?;

    Ok(Json(ApiEnvelope::ok_with_message(
        "Folder updated successfully",
        folder,
    )))
}

#[utoipa::path(
    delete,
    path = "/media/folders/{id}",
    tag = "folders",
    params(("id" = Uuid, Path, description = "Folder ID")),
    responses(
        (status = 200, description = "Folder deleted; its media move to the root", body = MessageEnvelope),
        (status = 404, description = "Folder not found", body = MessageEnvelope)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "delete_folder", folder_id = %id))]
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> Result<Json<ApiEnvelope<()>>, HttpAppError> {
    ensure_enabled(&state)?;

    let deleted = state
        .db
        .folder_repository
        .delete(id)
        .await
        .failed("Folder delete failed")?;
    if !deleted {
        return Err(AppError::NotFound("Folder not found".to_string()).into());
    }

    tracing::info!(folder_id = %id, "Folder deleted");
    Ok(Json(ApiEnvelope::message("Folder deleted successfully")))
}
