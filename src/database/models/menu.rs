use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single row in the `menus` table. Soft-deleted rows (`deleted_at` set)
/// are excluded from every read path but kept for audit tooling.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Menu {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Wire-facing tree node: a menu row annotated with its visible role ids
/// and its children, nested recursively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuTreeNode {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub order: i32,
    pub is_active: bool,
    pub roles: Vec<i32>,
    pub children: Vec<MenuTreeNode>,
}

impl MenuTreeNode {
    pub fn from_menu(menu: &Menu, roles: Vec<i32>) -> Self {
        Self {
            id: menu.id,
            parent_id: menu.parent_id,
            title: menu.title.clone(),
            url: menu.url.clone(),
            icon: menu.icon.clone(),
            order: menu.order,
            is_active: menu.is_active,
            roles,
            children: Vec::new(),
        }
    }
}

/// Validated input for creating or updating a menu. When `roles` is `Some`,
/// the menu's role associations are replaced wholesale with exactly that set.
#[derive(Debug, Clone, Default)]
pub struct SaveMenuData {
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub order: i32,
    pub is_active: bool,
    pub roles: Option<Vec<i32>>,
}

/// One entry of a batch reorder: the node's new sibling order and new parent
/// (None moves it to the root level).
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderEntry {
    pub id: Uuid,
    pub order: i32,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}
