//! OpenAPI documentation.
//!
//! Envelope shapes are spelled out per payload so the document shows the
//! concrete `data` type of each endpoint.

#![allow(dead_code)]

use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::handlers;
use mediapanel_core::models::{
    CreateFolderRequest, Folder, FolderTreeNode, MediaResource, UpdateFolderRequest,
    UpdateMediaRequest,
};

/// Envelope carrying one media resource.
#[derive(ToSchema)]
pub struct MediaEnvelope {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<MediaResource>,
}

/// Envelope carrying a list of media resources.
#[derive(ToSchema)]
pub struct MediaListEnvelope {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<Vec<MediaResource>>,
}

#[derive(ToSchema)]
pub struct FolderEnvelope {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<Folder>,
}

#[derive(ToSchema)]
pub struct FolderTreeEnvelope {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<Vec<FolderTreeNode>>,
}

/// Envelope without payload; also the shape of every failure.
#[derive(ToSchema)]
pub struct MessageEnvelope {
    pub success: bool,
    pub message: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub data: Option<()>,
}

/// Multipart upload form.
#[derive(ToSchema)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
    pub folder_id: Option<Uuid>,
    #[schema(max_length = 255)]
    pub title: Option<String>,
    #[schema(max_length = 255)]
    pub alt: Option<String>,
    #[schema(max_length = 500)]
    pub caption: Option<String>,
    pub description: Option<String>,
}

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MediaPanel API",
        version = "0.1.0",
        description = "Image library: upload with automatic resizing into named sizes, metadata editing, search, folders and deletion of every stored variant."
    ),
    paths(
        handlers::media::index,
        handlers::media::store,
        handlers::media::show,
        handlers::media::update,
        handlers::media::destroy,
        handlers::media::search,
        handlers::media::by_folder,
        handlers::folders::index,
        handlers::folders::store,
        handlers::folders::update,
        handlers::folders::destroy,
    ),
    components(schemas(
        MediaResource,
        UpdateMediaRequest,
        Folder,
        FolderTreeNode,
        CreateFolderRequest,
        UpdateFolderRequest,
        handlers::media::IndexResponse,
        MediaEnvelope,
        MediaListEnvelope,
        FolderEnvelope,
        FolderTreeEnvelope,
        MessageEnvelope,
        UploadForm,
    )),
    tags(
        (name = "media", description = "Upload, list, search, edit and delete images"),
        (name = "folders", description = "Folder tree used to group media")
    )
)]
pub struct ApiDoc;
