use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Menu, MenuTreeNode, ReorderEntry, SaveMenuData};
use crate::services::menu_tree;

const MENU_COLUMNS: &str =
    r#"id, parent_id, title, url, icon, "order", is_active, created_at, updated_at, deleted_at"#;

/// Depth guard for the recursive subtree CTE; corrupted parent chains stop
/// here instead of looping.
const MAX_SUBTREE_DEPTH: i32 = 64;

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("Menu not found: {0}")]
    NotFound(String),

    #[error("Parent menu not found: {0}")]
    ParentNotFound(Uuid),

    #[error("Cyclic parent assignment for menu {0}")]
    CyclicParent(Uuid),

    #[error("Unknown role ids: {0:?}")]
    UnknownRoles(Vec<i32>),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub struct MenuService {
    pool: PgPool,
}

impl MenuService {
    pub async fn new() -> Result<Self, MenuError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Full administrative tree: every non-deleted menu (active or not),
    /// nested by parent, siblings ordered by `"order"` with a stable
    /// insertion-order tie-break, each node carrying its role ids.
    pub async fn menu_tree(&self) -> Result<Vec<MenuTreeNode>, MenuError> {
        let menus = self.load_menus(false).await?;
        let roles_by_menu = self.load_role_ids().await?;
        let max_depth = crate::config::config().menu.max_tree_depth;
        Ok(menu_tree::assemble(&menus, &roles_by_menu, max_depth))
    }

    /// Role-scoped tree for a principal holding `role_names`: active,
    /// non-deleted menus whose role set intersects the principal's roles.
    /// Children are filtered independently, so a visible group may render
    /// with an empty child list, while children of an invisible parent
    /// never surface at any depth.
    pub async fn visible_menus(
        &self,
        role_names: &[String],
    ) -> Result<Vec<MenuTreeNode>, MenuError> {
        if role_names.is_empty() {
            return Ok(Vec::new());
        }

        let visible_ids: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT DISTINCT mr.menu_id
             FROM menu_roles mr
             JOIN roles r ON r.id = mr.role_id
             WHERE r.name = ANY($1)",
        )
        .bind(role_names)
        .fetch_all(&self.pool)
        .await?;
        let visible: std::collections::HashSet<Uuid> =
            visible_ids.into_iter().map(|(id,)| id).collect();

        let menus: Vec<Menu> = self
            .load_menus(true)
            .await?
            .into_iter()
            .filter(|m| visible.contains(&m.id))
            .collect();

        let roles_by_menu = self.load_role_ids().await?;
        let max_depth = crate::config::config().menu.max_tree_depth;
        Ok(menu_tree::assemble(&menus, &roles_by_menu, max_depth))
    }

    /// Fetch a single non-deleted menu or fail with NotFound.
    pub async fn find_menu(&self, id: Uuid) -> Result<Menu, MenuError> {
        let sql = format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE id = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Menu>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| MenuError::NotFound(format!("Menu not found: {}", id)))
    }

    /// Create a new menu, or update `existing` in place, in one transaction.
    ///
    /// The parent (when set) must exist and be non-deleted, and on update
    /// must not be the menu itself or one of its current descendants; the
    /// whole call rejects before any write otherwise. When `data.roles` is
    /// present the role associations are replaced wholesale with that set.
    pub async fn save_menu(
        &self,
        data: &SaveMenuData,
        existing: Option<&Menu>,
    ) -> Result<Menu, MenuError> {
        let mut tx = self.pool.begin().await?;

        if let Some(parent_id) = data.parent_id {
            let parent: Option<(Uuid,)> =
                sqlx::query_as("SELECT id FROM menus WHERE id = $1 AND deleted_at IS NULL")
                    .bind(parent_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if parent.is_none() {
                return Err(MenuError::ParentNotFound(parent_id));
            }

            if let Some(menu) = existing {
                let parents = Self::load_parent_map(&mut tx).await?;
                if menu_tree::creates_cycle(&parents, menu.id, parent_id) {
                    return Err(MenuError::CyclicParent(menu.id));
                }
            }
        }

        let saved = match existing {
            None => {
                let sql = format!(
                    r#"INSERT INTO menus (id, parent_id, title, url, icon, "order", is_active)
                       VALUES ($1, $2, $3, $4, $5, $6, $7)
                       RETURNING {MENU_COLUMNS}"#
                );
                sqlx::query_as::<_, Menu>(&sql)
                    .bind(Uuid::new_v4())
                    .bind(data.parent_id)
                    .bind(&data.title)
                    .bind(&data.url)
                    .bind(&data.icon)
                    .bind(data.order)
                    .bind(data.is_active)
                    .fetch_one(&mut *tx)
                    .await?
            }
            Some(menu) => {
                let sql = format!(
                    r#"UPDATE menus
                       SET parent_id = $2, title = $3, url = $4, icon = $5,
                           "order" = $6, is_active = $7, updated_at = now()
                       WHERE id = $1 AND deleted_at IS NULL
                       RETURNING {MENU_COLUMNS}"#
                );
                sqlx::query_as::<_, Menu>(&sql)
                    .bind(menu.id)
                    .bind(data.parent_id)
                    .bind(&data.title)
                    .bind(&data.url)
                    .bind(&data.icon)
                    .bind(data.order)
                    .bind(data.is_active)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or_else(|| MenuError::NotFound(format!("Menu not found: {}", menu.id)))?
            }
        };

        if let Some(role_ids) = &data.roles {
            Self::sync_roles(&mut tx, saved.id, role_ids).await?;
        }

        tx.commit().await?;
        Ok(saved)
    }

    /// Soft-delete a menu together with its entire descendant subtree,
    /// all-or-nothing. Returns the number of rows stamped.
    pub async fn delete_menu(&self, id: Uuid) -> Result<u64, MenuError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "WITH RECURSIVE subtree AS (
                 SELECT id, 0 AS depth FROM menus WHERE id = $1 AND deleted_at IS NULL
                 UNION ALL
                 SELECT m.id, s.depth + 1
                 FROM menus m
                 JOIN subtree s ON m.parent_id = s.id
                 WHERE m.deleted_at IS NULL AND s.depth < $2
             )
             UPDATE menus SET deleted_at = now(), updated_at = now()
             WHERE id IN (SELECT id FROM subtree)",
        )
        .bind(id)
        .bind(MAX_SUBTREE_DEPTH)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(MenuError::NotFound(format!("Menu not found: {}", id)));
        }

        tx.commit().await?;
        tracing::info!(menu_id = %id, rows = result.rows_affected(), "soft-deleted menu subtree");
        Ok(result.rows_affected())
    }

    /// Apply a batch of (id, order, parent_id) updates atomically. The batch
    /// is validated up front - unknown ids, unknown parents, or a parent
    /// assignment that would close a cycle reject the whole batch with no
    /// partial application.
    pub async fn reorder_menus(&self, entries: &[ReorderEntry]) -> Result<(), MenuError> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        let mut parents = Self::load_parent_map(&mut tx).await?;

        for entry in entries {
            if !parents.contains_key(&entry.id) {
                return Err(MenuError::NotFound(format!("Menu not found: {}", entry.id)));
            }
            if let Some(parent_id) = entry.parent_id {
                if !parents.contains_key(&parent_id) {
                    return Err(MenuError::ParentNotFound(parent_id));
                }
            }
        }

        // Check cycles against the batch outcome, not entry by entry: two
        // entries that are individually fine can still close a loop together.
        for entry in entries {
            parents.insert(entry.id, entry.parent_id);
        }
        for entry in entries {
            if let Some(parent_id) = entry.parent_id {
                if menu_tree::creates_cycle(&parents, entry.id, parent_id) {
                    return Err(MenuError::CyclicParent(entry.id));
                }
            }
        }

        for entry in entries {
            sqlx::query(
                r#"UPDATE menus SET "order" = $2, parent_id = $3, updated_at = now()
                   WHERE id = $1 AND deleted_at IS NULL"#,
            )
            .bind(entry.id)
            .bind(entry.order)
            .bind(entry.parent_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn load_menus(&self, active_only: bool) -> Result<Vec<Menu>, MenuError> {
        let sql = format!(
            r#"SELECT {MENU_COLUMNS} FROM menus
               WHERE deleted_at IS NULL{}
               ORDER BY "order", created_at, id"#,
            if active_only { " AND is_active" } else { "" }
        );
        Ok(sqlx::query_as::<_, Menu>(&sql).fetch_all(&self.pool).await?)
    }

    async fn load_role_ids(&self) -> Result<HashMap<Uuid, Vec<i32>>, MenuError> {
        let rows: Vec<(Uuid, i32)> =
            sqlx::query_as("SELECT menu_id, role_id FROM menu_roles ORDER BY role_id")
                .fetch_all(&self.pool)
                .await?;

        let mut map: HashMap<Uuid, Vec<i32>> = HashMap::new();
        for (menu_id, role_id) in rows {
            map.entry(menu_id).or_default().push(role_id);
        }
        Ok(map)
    }

    async fn load_parent_map(
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<HashMap<Uuid, Option<Uuid>>, MenuError> {
        let rows: Vec<(Uuid, Option<Uuid>)> =
            sqlx::query_as("SELECT id, parent_id FROM menus WHERE deleted_at IS NULL")
                .fetch_all(&mut **tx)
                .await?;
        Ok(rows.into_iter().collect())
    }

    /// Replace the menu's role associations with exactly `role_ids`.
    async fn sync_roles(
        tx: &mut Transaction<'_, Postgres>,
        menu_id: Uuid,
        role_ids: &[i32],
    ) -> Result<(), MenuError> {
        if !role_ids.is_empty() {
            let known: Vec<(i32,)> = sqlx::query_as("SELECT id FROM roles WHERE id = ANY($1)")
                .bind(role_ids)
                .fetch_all(&mut **tx)
                .await?;
            let known: std::collections::HashSet<i32> =
                known.into_iter().map(|(id,)| id).collect();
            let missing: Vec<i32> = role_ids
                .iter()
                .copied()
                .filter(|id| !known.contains(id))
                .collect();
            if !missing.is_empty() {
                return Err(MenuError::UnknownRoles(missing));
            }
        }

        sqlx::query("DELETE FROM menu_roles WHERE menu_id = $1")
            .bind(menu_id)
            .execute(&mut **tx)
            .await?;

        if !role_ids.is_empty() {
            sqlx::query(
                "INSERT INTO menu_roles (menu_id, role_id)
                 SELECT $1, unnest($2::int4[])
                 ON CONFLICT DO NOTHING",
            )
            .bind(menu_id)
            .bind(role_ids)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}
