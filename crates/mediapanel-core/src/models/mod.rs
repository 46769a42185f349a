//! Domain models: media records, folders and the response envelope.

pub mod envelope;
pub mod folder;
pub mod media;

pub use envelope::ApiEnvelope;
pub use folder::{slugify, CreateFolderRequest, Folder, FolderTreeNode, UpdateFolderRequest};
pub use media::{
    variant_key, webp_sibling_key, FolderScope, Media, MediaFilter, MediaResource, NewMedia,
    UpdateMediaRequest, UploadMetadata,
};
