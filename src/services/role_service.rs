use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::Role;

#[derive(Debug, Error)]
pub enum RoleError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Read access to the roles catalog with an in-process cache.
///
/// The catalog changes rarely (role administration lives elsewhere), so the
/// menu endpoints read through a cached copy. Anything that mutates roles
/// out of band is expected to call `invalidate()`; the cache is an explicit
/// object shared through router state, never ambient global state.
#[derive(Default)]
pub struct RoleService {
    cache: RwLock<Option<Arc<Vec<Role>>>>,
}

impl RoleService {
    pub fn new() -> Self {
        Self::default()
    }

    /// All roles, cached after the first successful read.
    pub async fn list_roles(&self) -> Result<Arc<Vec<Role>>, RoleError> {
        {
            let cache = self.cache.read().await;
            if let Some(roles) = cache.as_ref() {
                return Ok(roles.clone());
            }
        }

        let pool = DatabaseManager::pool().await?;
        let roles: Vec<Role> =
            sqlx::query_as("SELECT id, name, created_at, updated_at FROM roles ORDER BY name")
                .fetch_all(&pool)
                .await?;

        let roles = Arc::new(roles);
        {
            let mut cache = self.cache.write().await;
            *cache = Some(roles.clone());
        }
        Ok(roles)
    }

    /// Drop the cached catalog; the next read reloads from the database.
    pub async fn invalidate(&self) {
        let mut cache = self.cache.write().await;
        *cache = None;
        tracing::debug!("role cache invalidated");
    }
}
