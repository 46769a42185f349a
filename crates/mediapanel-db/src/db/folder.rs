use mediapanel_core::{
    models::{slugify, CreateFolderRequest, Folder, FolderTreeNode, UpdateFolderRequest},
    AppError,
};
use sqlx::{PgPool, Postgres};
use std::collections::HashMap;
use uuid::Uuid;

const FOLDER_COLUMNS: &str = "id, name, slug, parent_id, created_at, updated_at";

#[derive(Debug, Clone, sqlx::FromRow)]
struct FolderCountRow {
    id: Uuid,
    name: String,
    slug: String,
    parent_id: Option<Uuid>,
    media_count: i64,
}

/// Assemble flat rows into nested nodes, siblings sorted by name.
fn build_tree(rows: Vec<FolderCountRow>) -> Vec<FolderTreeNode> {
    let mut by_parent: HashMap<Option<Uuid>, Vec<FolderCountRow>> = HashMap::new();
    for row in rows {
        by_parent.entry(row.parent_id).or_default().push(row);
    }

    fn attach(
        parent: Option<Uuid>,
        by_parent: &mut HashMap<Option<Uuid>, Vec<FolderCountRow>>,
    ) -> Vec<FolderTreeNode> {
        let mut nodes: Vec<FolderTreeNode> = by_parent
            .remove(&parent)
            .unwrap_or_default()
            .into_iter()
            .map(|row| FolderTreeNode {
                id: row.id,
                name: row.name,
                slug: row.slug,
                parent_id: row.parent_id,
                media_count: row.media_count,
                children: Vec::new(),
            })
            .collect();

        for node in &mut nodes {
            node.children = attach(Some(node.id), by_parent);
        }
        nodes.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        nodes
    }

    attach(None, &mut by_parent)
}

/// Repository for managing folders
#[derive(Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn slug_for(name: &str) -> Result<String, AppError> {
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(AppError::BadRequest(
                "Folder name must contain at least one letter or digit".to_string(),
            ));
        }
        Ok(slug)
    }

    fn duplicate_slug(slug: &str) -> AppError {
        AppError::Conflict(format!("A folder with slug '{}' already exists", slug))
    }

    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM media_folders WHERE slug = $1 AND id IS DISTINCT FROM $2)",
        )
        .bind(slug)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM media_folders WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Create a new folder
    #[tracing::instrument(skip(self), fields(db.table = "media_folders", db.operation = "insert"))]
    pub async fn create(&self, request: CreateFolderRequest) -> Result<Folder, AppError> {
        let slug = Self::slug_for(&request.name)?;

        if let Some(pid) = request.parent_id {
            if !self.exists(pid).await? {
                return Err(AppError::NotFound("Parent folder not found".to_string()));
            }
        }

        if self.slug_taken(&slug, None).await? {
            return Err(Self::duplicate_slug(&slug));
        }

        let query = format!(
            "INSERT INTO media_folders (id, name, slug, parent_id) VALUES ($1, $2, $3, $4) RETURNING {}",
            FOLDER_COLUMNS
        );
        let result = sqlx::query_as::<Postgres, Folder>(&query)
            .bind(Uuid::new_v4())
            .bind(request.name.trim())
            .bind(&slug)
            .bind(request.parent_id)
            .fetch_one(&self.pool)
            .await;

        // Two concurrent creates can both pass the check above.
        result.map_err(|e| {
            let err = AppError::from(e);
            if err.is_unique_violation() {
                Self::duplicate_slug(&slug)
            } else {
                err
            }
        })
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_folders", db.operation = "select", db.record_id = %id))]
    pub async fn find(&self, id: Uuid) -> Result<Option<Folder>, AppError> {
        let query = format!("SELECT {} FROM media_folders WHERE id = $1", FOLDER_COLUMNS);
        let folder = sqlx::query_as::<Postgres, Folder>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(folder)
    }

    /// Get hierarchical folder tree with the number of media directly in each folder.
    #[tracing::instrument(skip(self), fields(db.table = "media_folders", db.operation = "select"))]
    pub async fn tree(&self) -> Result<Vec<FolderTreeNode>, AppError> {
        let rows = sqlx::query_as::<Postgres, FolderCountRow>(
            r#"
            SELECT f.id, f.name, f.slug, f.parent_id, COUNT(m.id) AS media_count
            FROM media_folders f
            LEFT JOIN media m ON m.folder_id = f.id
            GROUP BY f.id, f.name, f.slug, f.parent_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(build_tree(rows))
    }

    /// Rename and/or move a folder. Renaming regenerates the slug.
    #[tracing::instrument(skip(self), fields(db.table = "media_folders", db.operation = "update", db.record_id = %id))]
    pub async fn update(&self, id: Uuid, request: UpdateFolderRequest) -> Result<Folder, AppError> {
        if !self.exists(id).await? {
            return Err(AppError::NotFound("Folder not found".to_string()));
        }

        let slug = match request.name {
            Some(ref name) => {
                let slug = Self::slug_for(name)?;
                if self.slug_taken(&slug, Some(id)).await? {
                    return Err(Self::duplicate_slug(&slug));
                }
                Some(slug)
            }
            None => None,
        };

        if let Some(Some(pid)) = request.parent_id {
            if !self.exists(pid).await? {
                return Err(AppError::NotFound("Parent folder not found".to_string()));
            }
            if self.is_in_subtree(id, pid).await? {
                return Err(AppError::BadRequest(
                    "Cannot move folder: would create a cycle".to_string(),
                ));
            }
        }

        // Build update query
        let mut query = String::from("UPDATE media_folders SET updated_at = NOW()");
        let mut bind_index = 1;

        if slug.is_some() {
            query.push_str(&format!(
                ", name = ${}, slug = ${}",
                bind_index,
                bind_index + 1
            ));
            bind_index += 2;
        }

        if request.parent_id.is_some() {
            query.push_str(&format!(", parent_id = ${}", bind_index));
            bind_index += 1;
        }

        query.push_str(&format!(
            " WHERE id = ${} RETURNING {}",
            bind_index, FOLDER_COLUMNS
        ));

        let mut query_builder = sqlx::query_as::<Postgres, Folder>(&query);
        if let (Some(name), Some(slug)) = (&request.name, &slug) {
            query_builder = query_builder.bind(name.trim()).bind(slug);
        }
        if let Some(new_parent) = request.parent_id {
            query_builder = query_builder.bind(new_parent);
        }
        query_builder = query_builder.bind(id);

        let result = query_builder.fetch_optional(&self.pool).await;
        match result {
            Ok(Some(folder)) => Ok(folder),
            Ok(None) => Err(AppError::NotFound("Folder not found".to_string())),
            Err(e) => {
                let err = AppError::from(e);
                match slug {
                    Some(ref slug) if err.is_unique_violation() => Err(Self::duplicate_slug(slug)),
                    _ => Err(err),
                }
            }
        }
    }

    /// Delete a folder. Subfolders go with it; their media drop to the root.
    #[tracing::instrument(skip(self), fields(db.table = "media_folders", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let rows_affected = sqlx::query("DELETE FROM media_folders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    /// True when `candidate` is `root` or lies anywhere below it.
    async fn is_in_subtree(&self, root: Uuid, candidate: Uuid) -> Result<bool, AppError> {
        if root == candidate {
            return Ok(true);
        }

        let found: bool = sqlx::query_scalar(
            r#"
            WITH RECURSIVE subtree AS (
                SELECT id FROM media_folders WHERE id = $1
                UNION ALL
                SELECT f.id FROM media_folders f JOIN subtree s ON f.parent_id = s.id
            )
            SELECT EXISTS(SELECT 1 FROM subtree WHERE id = $2)
            "#,
        )
        .bind(root)
        .bind(candidate)
        .fetch_one(&self.pool)
        .await?;

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, parent_id: Option<Uuid>, media_count: i64) -> FolderCountRow {
        FolderCountRow {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slugify(name),
            parent_id,
            media_count,
        }
    }

    #[test]
    fn test_build_tree_nests_grandchildren() {
        let photos = row("Photos", None, 2);
        let summer = row("Summer", Some(photos.id), 5);
        let beach = row("Beach", Some(summer.id), 1);
        let archive = row("archive", None, 0);

        let tree = build_tree(vec![beach, summer.clone(), photos.clone(), archive]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].name, "archive");
        assert_eq!(tree[1].id, photos.id);
        assert_eq!(tree[1].media_count, 2);
        assert_eq!(tree[1].children.len(), 1);
        assert_eq!(tree[1].children[0].id, summer.id);
        assert_eq!(tree[1].children[0].children[0].name, "Beach");
        assert_eq!(tree[1].children[0].children[0].media_count, 1);
    }

    #[test]
    fn test_build_tree_sorts_siblings() {
        let root = row("Root", None, 0);
        let tree = build_tree(vec![
            row("zeta", Some(root.id), 0),
            row("Alpha", Some(root.id), 0),
            row("mid", Some(root.id), 0),
            root,
        ]);

        let names: Vec<&str> = tree[0].children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_slug_for_rejects_symbol_only_names() {
        assert!(matches!(
            FolderRepository::slug_for("!!!"),
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(FolderRepository::slug_for("My Logos").unwrap(), "my-logos");
    }
}
