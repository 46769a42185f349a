//! MediaPanel persistence: media and folder repositories over PostgreSQL.

pub mod db;

pub use db::{FolderRepository, MediaRepository};
