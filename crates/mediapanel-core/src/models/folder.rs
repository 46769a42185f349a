use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Folder used to group media for filtering. Folders never affect where files are stored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating a new folder
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateFolderRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Folder name must be between 1 and 255 characters"
    ))]
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Request DTO for updating a folder
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateFolderRequest {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 255,
        message = "Folder name must be between 1 and 255 characters"
    ))]
    pub name: Option<String>,
    /// Absent leaves the parent alone; `null` moves the folder to the root.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub parent_id: Option<Option<Uuid>>,
}

/// Folder tree node for hierarchical representation
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FolderTreeNode {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<Uuid>,
    pub media_count: i64,
    #[schema(no_recursion)]
    pub children: Vec<FolderTreeNode>,
}

/// URL-safe slug: lowercase alphanumerics separated by single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Holiday Photos"), "holiday-photos");
        assert_eq!(slugify("  2024 -- Summer!! "), "2024-summer");
        assert_eq!(slugify("Café Menu"), "café-menu");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_update_folder_parent_null_moves_to_root() {
        let req: UpdateFolderRequest = serde_json::from_str(r#"{"parent_id": null}"#).unwrap();
        assert_eq!(req.parent_id, Some(None));
        assert!(req.name.is_none());

        let req: UpdateFolderRequest = serde_json::from_str(r#"{"name": "Logos"}"#).unwrap();
        assert_eq!(req.parent_id, None);
    }

    #[test]
    fn test_create_folder_validation() {
        let req = CreateFolderRequest {
            name: String::new(),
            parent_id: None,
        };
        assert!(req.validate().is_err());
    }
}
