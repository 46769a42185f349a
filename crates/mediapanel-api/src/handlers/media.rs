//! Media library endpoints.
//!
//! `GET /media` and `POST /media` serve both browsers and the picker: browsers
//! get the HTML page and a redirect with a flash message, AJAX/JSON clients get
//! JSON. Every other endpoint answers with the `{success, message, data}` envelope.

use crate::api_doc::{MediaEnvelope, MediaListEnvelope, MessageEnvelope, UploadForm};
use crate::error::{FailureContext, HttpAppError, ValidatedJson, ValidatedPath};
use crate::state::AppState;
use crate::utils::flash::Flash;
use crate::utils::upload::{extract_upload, parse_folder_id};
use crate::views::{flatten_tree, index_page, modal_body, FolderOption, LibraryView};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use mediapanel_core::models::{
    ApiEnvelope, FolderScope, MediaFilter, MediaResource, UpdateMediaRequest,
};
use mediapanel_core::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

const UPLOAD_SUCCESS: &str = "Image uploaded successfully";

/// AJAX requests and clients asking for JSON get JSON; everyone else gets HTML.
pub(crate) fn wants_json(headers: &HeaderMap) -> bool {
    let ajax = headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));
    let accepts_json = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    ajax || accepts_json
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IndexQuery {
    /// Only media in this folder (ignored when folders are disabled)
    pub folder_id: Option<String>,
    /// Case-insensitive match on name, title or alt
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Search term (required)
    pub query: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FolderQuery {
    /// Folder id; absent or empty lists media without a folder
    pub folder_id: Option<String>,
}

/// JSON answer of the library listing for the picker.
#[derive(Debug, Serialize, ToSchema)]
pub struct IndexResponse {
    pub success: bool,
    /// Rendered picker body
    pub html: String,
    pub data: Vec<MediaResource>,
}

async fn folder_options(state: &AppState) -> Vec<FolderOption> {
    if !state.media.settings.folders_enabled {
        return Vec::new();
    }
    match state.db.folder_repository.tree().await {
        Ok(tree) => flatten_tree(&tree),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load folders for the library view");
            Vec::new()
        }
    }
}

#[utoipa::path(
    get,
    path = "/media",
    tag = "media",
    params(IndexQuery),
    responses(
        (status = 200, description = "HTML library page, or the picker listing for AJAX/JSON clients", body = IndexResponse),
        (status = 400, description = "Malformed folder id", body = MessageEnvelope),
        (status = 500, description = "Listing failed", body = MessageEnvelope)
    )
)]
#[tracing::instrument(skip(state, headers), fields(operation = "list_media"))]
pub async fn index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<IndexQuery>,
) -> Result<Response, HttpAppError> {
    let settings = &state.media.settings;
    let folder_id = match query.folder_id.as_deref() {
        Some(raw) if settings.folders_enabled => {
            parse_folder_id(raw).failed("Failed to fetch media")?
        }
        _ => None,
    };
    let filter = MediaFilter {
        folder: folder_id.map_or(FolderScope::Any, FolderScope::Folder),
        search: query.search.clone(),
    };

    let listing = state.media.service.all(&filter).await;
    let folders = folder_options(&state).await;
    let search = filter.search_term();

    if wants_json(&headers) {
        let resources = state
            .media
            .service
            .to_resources(listing.failed("Failed to fetch media")?);
        let view = LibraryView {
            media: &resources,
            folders: &folders,
            settings,
            search,
            folder_id,
        };
        let html = modal_body(&view).into_string();
        return Ok(Json(IndexResponse {
            success: true,
            html,
            data: resources,
        })
        .into_response());
    }

    let incoming_flash = Flash::from_headers(&headers);
    let had_flash = incoming_flash.is_some();
    let (resources, flash) = match listing {
        Ok(media) => (state.media.service.to_resources(media), incoming_flash),
        Err(e) => {
            let err = HttpAppError::from(e).context("Failed to fetch media");
            tracing::error!(error = %err.error, "Failed to list media for the library page");
            (Vec::new(), Some(Flash::error(err.client_message())))
        }
    };
    let view = LibraryView {
        media: &resources,
        folders: &folders,
        settings,
        search,
        folder_id,
    };
    let page = Html(index_page(&view, flash.as_ref()).into_string());

    if had_flash {
        Ok(([(header::SET_COOKIE, Flash::CLEAR_COOKIE)], page).into_response())
    } else {
        Ok(page.into_response())
    }
}

async fn upload_from_form(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<MediaResource, HttpAppError> {
    let multipart = multipart
        .map_err(|e| AppError::InvalidInput(e.body_text()))
        .failed("Media upload failed")?;
    let (image, metadata) = extract_upload(multipart, state.media.settings.max_size_kb)
        .await
        .failed("Media upload failed")?;
    let media = state
        .media
        .service
        .upload(image, metadata)
        .await
        .failed("Media upload failed")?;
    Ok(state.media.service.to_resource(media))
}

fn redirect_with_flash(flash: Flash) -> Response {
    (
        [(header::SET_COOKIE, flash.to_cookie())],
        Redirect::to("/media"),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/media",
    tag = "media",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image uploaded successfully", body = MediaEnvelope),
        (status = 303, description = "Form post: redirect to /media with a flash message"),
        (status = 400, description = "Invalid image type, undecodable file or bad metadata", body = MessageEnvelope),
        (status = 404, description = "Folder not found", body = MessageEnvelope),
        (status = 413, description = "File size exceeds the configured maximum", body = MessageEnvelope),
        (status = 500, description = "Storage or database failure", body = MessageEnvelope)
    )
)]
#[tracing::instrument(skip(state, headers, multipart), fields(operation = "upload_media"))]
pub async fn store(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let result = upload_from_form(&state, multipart).await;

    match (result, wants_json(&headers)) {
        (Ok(resource), true) => (
            StatusCode::CREATED,
            Json(ApiEnvelope::ok_with_message(UPLOAD_SUCCESS, resource)),
        )
            .into_response(),
        (Ok(_), false) => redirect_with_flash(Flash::success(UPLOAD_SUCCESS)),
        (Err(e), true) => e.into_response(),
        (Err(e), false) => {
            tracing::warn!(error = %e.error, "Upload from form failed");
            redirect_with_flash(Flash::error(e.client_message()))
        }
    }
}

#[utoipa::path(
    get,
    path = "/media/{id}",
    tag = "media",
    params(("id" = Uuid, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Media record", body = MediaEnvelope),
        (status = 404, description = "Media not found", body = MessageEnvelope)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_media", media_id = %id))]
pub async fn show(
    State(state): State<Arc<AppState>>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> Result<Json<ApiEnvelope<MediaResource>>, HttpAppError> {
    let media = state
        .media
        .service
        .find(id)
        .await
        .failed("Failed to fetch media")?
        .ok_or_else(|| HttpAppError::from(AppError::NotFound("Media not found".to_string())))?;

    Ok(Json(ApiEnvelope::ok(state.media.service.to_resource(media))))
}

#[utoipa::path(
    put,
    path = "/media/{id}",
    tag = "media",
    params(("id" = Uuid, Path, description = "Media ID")),
    request_body = UpdateMediaRequest,
    responses(
        (status = 200, description = "Media updated successfully", body = MediaEnvelope),
        (status = 400, description = "Invalid metadata", body = MessageEnvelope),
        (status = 404, description = "Media or folder not found", body = MessageEnvelope)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "update_media", media_id = %id))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    ValidatedPath(id): ValidatedPath<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateMediaRequest>,
) -> Result<Json<ApiEnvelope<MediaResource>>, HttpAppError> {
    let media = state
        .media
        .service
        .update(id, request)
        .await
        .failed("Media update failed")?;

    Ok(Json(ApiEnvelope::ok_with_message(
        "Media updated successfully",
        state.media.service.to_resource(media),
    )))
}

#[utoipa::path(
    delete,
    path = "/media/{id}",
    tag = "media",
    params(("id" = Uuid, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Media deleted successfully", body = MessageEnvelope),
        (status = 404, description = "Media not found", body = MessageEnvelope),
        (status = 500, description = "A file could not be removed; the record is kept", body = MessageEnvelope)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "delete_media", media_id = %id))]
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> Result<Json<ApiEnvelope<()>>, HttpAppError> {
    state
        .media
        .service
        .delete(id)
        .await
        .failed("Media delete failed")?;

    Ok(Json(ApiEnvelope::message("Media deleted successfully")))
}

#[utoipa::path(
    get,
    path = "/media/search",
    tag = "media",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching media, newest first", body = MediaListEnvelope),
        (status = 400, description = "Missing query", body = MessageEnvelope)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "search_media"))]
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiEnvelope<Vec<MediaResource>>>, HttpAppError> {
    let term = query
        .query
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::InvalidInput("The query field is required".to_string()))
        .failed("Search failed")?;

    let media = state
        .media
        .service
        .search(term)
        .await
        .failed("Search failed")?;

    Ok(Json(ApiEnvelope::ok(state.media.service.to_resources(media))))
}

#[utoipa::path(
    get,
    path = "/media/folder",
    tag = "media",
    params(FolderQuery),
    responses(
        (status = 200, description = "Media in the folder, or without a folder", body = MediaListEnvelope),
        (status = 400, description = "Malformed folder id", body = MessageEnvelope)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "media_by_folder"))]
pub async fn by_folder(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FolderQuery>,
) -> Result<Json<ApiEnvelope<Vec<MediaResource>>>, HttpAppError> {
    let folder_id = parse_folder_id(query.folder_id.as_deref().unwrap_or(""))
        .failed("Failed to fetch media")?;

    let media = state
        .media
        .service
        .by_folder(folder_id)
        .await
        .failed("Failed to fetch media")?;

    Ok(Json(ApiEnvelope::ok(state.media.service.to_resources(media))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_wants_json() {
        let mut headers = HeaderMap::new();
        assert!(!wants_json(&headers));

        headers.insert(header::ACCEPT, HeaderValue::from_static("text/html,*/*"));
        assert!(!wants_json(&headers));

        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json, text/plain"),
        );
        assert!(wants_json(&headers));

        let mut ajax = HeaderMap::new();
        ajax.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
        assert!(wants_json(&ajax));
    }
}
