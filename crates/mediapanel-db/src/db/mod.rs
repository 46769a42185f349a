//! Database repositories for data access layer
//!
//! One repository per entity. `MediaRepository` also owns the delete cascade,
//! which removes every stored variant before the row.

pub mod folder;
pub mod media;

pub use folder::FolderRepository;
pub use media::MediaRepository;
