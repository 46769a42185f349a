use crate::services::MediaService;
use mediapanel_core::MediaSettings;
use mediapanel_db::{FolderRepository, MediaRepository};
use mediapanel_storage::Storage;
use sqlx::PgPool;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub folder_repository: FolderRepository,
}

/// A local disk served over HTTP: files under `root` answer at `mount`.
#[derive(Clone, Debug)]
pub struct PublicDisk {
    pub mount: String,
    pub root: PathBuf,
}

#[derive(Clone)]
pub struct MediaConfig {
    pub service: MediaService,
    pub storage: Arc<dyn Storage>,
    pub settings: Arc<MediaSettings>,
    pub public_disk: Option<PublicDisk>,
}

#[derive(Clone, Debug)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
}

pub struct AppState {
    pub db: DbState,
    pub media: MediaConfig,
    pub security: SecurityConfig,
}

impl AppState {
    /// Wire repositories and the media service around one pool and one disk.
    pub fn new(
        pool: PgPool,
        storage: Arc<dyn Storage>,
        settings: MediaSettings,
        public_disk: Option<PublicDisk>,
        security: SecurityConfig,
    ) -> Self {
        let settings = Arc::new(settings);
        let media_repository =
            MediaRepository::new(pool.clone(), storage.clone(), settings.clone());
        let folder_repository = FolderRepository::new(pool.clone());
        let service = MediaService::new(
            storage.clone(),
            settings.clone(),
            media_repository,
            folder_repository.clone(),
        );

        Self {
            db: DbState {
                pool,
                folder_repository,
            },
            media: MediaConfig {
                service,
                storage,
                settings,
                public_disk,
            },
            security,
        }
    }
}
