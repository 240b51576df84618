use axum::extract::State;
use serde_json::{json, Value};

use crate::handlers::AppState;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::menu_service::MenuService;

/// GET /api/menus - full administrative tree plus the roles catalog for UI
/// population
pub async fn tree_get(State(state): State<AppState>) -> ApiResult<Value> {
    let service = MenuService::new().await?;
    let menu_tree = service.menu_tree().await?;
    let roles = state.roles.list_roles().await?;

    let roles: Vec<Value> = roles
        .iter()
        .map(|r| json!({ "id": r.id, "name": r.name }))
        .collect();

    Ok(ApiResponse::success(
        "Menus retrieved successfully",
        json!({ "menu_tree": menu_tree, "roles": roles }),
    ))
}
