use std::sync::Arc;

use crate::services::role_service::RoleService;

pub mod menus;

/// Shared router state. The role cache travels here explicitly instead of
/// living in a process-wide global.
#[derive(Clone)]
pub struct AppState {
    pub roles: Arc<RoleService>,
}
