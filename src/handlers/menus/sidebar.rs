use axum::Extension;
use serde_json::{json, Value};

use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::menu_service::MenuService;

/// GET /api/menus/sidebar - active menus visible to the authenticated
/// principal, filtered by role overlap at every depth
pub async fn sidebar_get(Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    let service = MenuService::new().await?;
    let menus = service.visible_menus(&user.roles).await?;

    Ok(ApiResponse::success(
        "Sidebar menus retrieved successfully",
        json!({ "menus": menus }),
    ))
}
