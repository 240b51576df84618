use axum::extract::Path;
use uuid::Uuid;

use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::menu_service::MenuService;

/// DELETE /api/menus/:id - soft-delete the menu and its whole subtree
pub async fn menu_delete(Path(id): Path<Uuid>) -> ApiResult<()> {
    let service = MenuService::new().await?;
    service.delete_menu(id).await?;
    Ok(ApiResponse::message_only("Menu deleted successfully"))
}
