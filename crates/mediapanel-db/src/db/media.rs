use mediapanel_core::models::{FolderScope, Media, MediaFilter, NewMedia, UpdateMediaRequest};
use mediapanel_core::{AppError, MediaSettings};
use mediapanel_storage::Storage;
use sqlx::{PgPool, Postgres};
use std::sync::Arc;
use uuid::Uuid;

const MEDIA_COLUMNS: &str = "id, name, path, mime, size, width, height, folder_id, \
     title, alt, caption, description, created_at, updated_at";

/// Escape `%`, `_` and `\` so user input matches literally inside a LIKE pattern.
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Media repository
///
/// Rows are the single source of truth for which files exist; every variant
/// is derived from `path` and `name` using the configured sizes.
#[derive(Clone)]
pub struct MediaRepository {
    pool: PgPool,
    storage: Arc<dyn Storage>,
    settings: Arc<MediaSettings>,
}

impl MediaRepository {
    pub fn new(pool: PgPool, storage: Arc<dyn Storage>, settings: Arc<MediaSettings>) -> Self {
        Self {
            pool,
            storage,
            settings,
        }
    }

    /// Insert the row for a fully ingested upload.
    #[tracing::instrument(skip(self, media), fields(db.table = "media", db.operation = "insert", media.name = %media.name))]
    pub async fn store(&self, media: NewMedia) -> Result<Media, AppError> {
        let query = format!(
            r#"
            INSERT INTO media (id, name, path, mime, size, width, height, folder_id, title, alt, caption, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            MEDIA_COLUMNS
        );

        let row = sqlx::query_as::<Postgres, Media>(&query)
            .bind(Uuid::new_v4())
            .bind(&media.name)
            .bind(&media.path)
            .bind(&media.mime)
            .bind(media.size)
            .bind(media.width)
            .bind(media.height)
            .bind(media.folder_id)
            .bind(&media.title)
            .bind(&media.alt)
            .bind(&media.caption)
            .bind(&media.description)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select", db.record_id = %id))]
    pub async fn find(&self, id: Uuid) -> Result<Option<Media>, AppError> {
        let query = format!("SELECT {} FROM media WHERE id = $1", MEDIA_COLUMNS);
        let row = sqlx::query_as::<Postgres, Media>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// List media matching `filter`, newest first.
    ///
    /// The search term matches name, title or alt, case-insensitively.
    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select"))]
    pub async fn all(&self, filter: &MediaFilter) -> Result<Vec<Media>, AppError> {
        let mut query = format!("SELECT {} FROM media WHERE 1 = 1", MEDIA_COLUMNS);
        let mut bind_index = 1;

        match filter.folder {
            FolderScope::Any => {}
            FolderScope::Root => query.push_str(" AND folder_id IS NULL"),
            FolderScope::Folder(_) => {
                query.push_str(&format!(" AND folder_id = ${}", bind_index));
                bind_index += 1;
            }
        }

        let pattern = filter
            .search_term()
            .map(|term| format!("%{}%", escape_like(term)));
        if pattern.is_some() {
            query.push_str(&format!(
                r" AND (name ILIKE ${i} ESCAPE '\' OR title ILIKE ${i} ESCAPE '\' OR alt ILIKE ${i} ESCAPE '\')",
                i = bind_index
            ));
        }

        query.push_str(" ORDER BY created_at DESC, id DESC");

        let mut query_builder = sqlx::query_as::<Postgres, Media>(&query);
        if let FolderScope::Folder(folder_id) = filter.folder {
            query_builder = query_builder.bind(folder_id);
        }
        if let Some(ref pattern) = pattern {
            query_builder = query_builder.bind(pattern);
        }

        let rows = query_builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Media in one folder, or without a folder when `folder_id` is `None`.
    pub async fn by_folder(&self, folder_id: Option<Uuid>) -> Result<Vec<Media>, AppError> {
        let folder = match folder_id {
            Some(id) => FolderScope::Folder(id),
            None => FolderScope::Root,
        };
        self.all(&MediaFilter {
            folder,
            search: None,
        })
        .await
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Media>, AppError> {
        self.all(&MediaFilter {
            folder: FolderScope::Any,
            search: Some(term.to_string()),
        })
        .await
    }

    /// Apply a partial metadata update. Fields absent from `update` are left alone.
    #[tracing::instrument(skip(self, update), fields(db.table = "media", db.operation = "update", db.record_id = %id))]
    pub async fn update(&self, id: Uuid, update: UpdateMediaRequest) -> Result<Media, AppError> {
        let mut query = String::from("UPDATE media SET updated_at = NOW()");
        let mut bind_index = 1;

        let text_fields = [
            ("title", &update.title),
            ("alt", &update.alt),
            ("caption", &update.caption),
            ("description", &update.description),
        ];
        for (column, value) in &text_fields {
            if value.is_some() {
                query.push_str(&format!(", {} = ${}", column, bind_index));
                bind_index += 1;
            }
        }
        if update.folder_id.is_some() {
            query.push_str(&format!(", folder_id = ${}", bind_index));
            bind_index += 1;
        }

        query.push_str(&format!(
            " WHERE id = ${} RETURNING {}",
            bind_index, MEDIA_COLUMNS
        ));

        let mut query_builder = sqlx::query_as::<Postgres, Media>(&query);
        for (_, value) in text_fields {
            if let Some(value) = value {
                query_builder = query_builder.bind(value.as_deref());
            }
        }
        if let Some(folder_id) = update.folder_id {
            query_builder = query_builder.bind(folder_id);
        }
        query_builder = query_builder.bind(id);

        query_builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Media not found".to_string()))
    }

    /// Delete a media record and every file it may have produced.
    ///
    /// Files go first, then the row. A storage failure aborts with the row
    /// still in place; a failed row delete after the files are gone leaves a
    /// row without files. Returns `false` when no such record exists.
    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let Some(media) = self.find(id).await? else {
            return Ok(false);
        };

        for key in media.variant_keys(&self.settings) {
            self.storage.delete(&key).await.map_err(|e| {
                tracing::error!(error = %e, key = %key, "Failed to delete media variant");
                AppError::Storage(format!("Storage delete failed: {}", e))
            })?;
        }

        let rows_affected = sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
