use axum::{extract::Path, Json};
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::{Menu, SaveMenuData};
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::menu_service::MenuService;

const MAX_STRING_LEN: usize = 255;

/// Body for POST /api/menus and PUT /api/menus/:id
#[derive(Debug, Deserialize)]
pub struct MenuPayload {
    pub title: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<Uuid>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
    pub roles: Option<Vec<i32>>,
}

impl MenuPayload {
    /// Field-level validation, rejected before any mutation
    pub fn validate(self) -> Result<SaveMenuData, ApiError> {
        let mut field_errors: HashMap<String, String> = HashMap::new();

        let title = self.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            field_errors.insert("title".into(), "This field is required".into());
        } else if title.len() > MAX_STRING_LEN {
            field_errors.insert(
                "title".into(),
                format!("Must be at most {} characters", MAX_STRING_LEN),
            );
        }

        for (field, value) in [("url", &self.url), ("icon", &self.icon)] {
            if let Some(v) = value {
                if v.len() > MAX_STRING_LEN {
                    field_errors.insert(
                        field.into(),
                        format!("Must be at most {} characters", MAX_STRING_LEN),
                    );
                }
            }
        }

        let order = self.order.unwrap_or(0);
        if order < 0 {
            field_errors.insert("order".into(), "Must be a non-negative integer".into());
        }

        if !field_errors.is_empty() {
            return Err(ApiError::validation_error(
                "Invalid menu data",
                Some(field_errors),
            ));
        }

        Ok(SaveMenuData {
            parent_id: self.parent_id,
            title: title.to_string(),
            url: self.url,
            icon: self.icon,
            order,
            is_active: self.is_active.unwrap_or(true),
            roles: self.roles,
        })
    }
}

/// POST /api/menus - create a menu
pub async fn menu_post(Json(payload): Json<MenuPayload>) -> ApiResult<Menu> {
    let data = payload.validate()?;
    let service = MenuService::new().await?;
    let menu = service.save_menu(&data, None).await?;
    Ok(ApiResponse::created("Menu created successfully", menu))
}

/// PUT /api/menus/:id - update a menu in place
pub async fn menu_put(Path(id): Path<Uuid>, Json(payload): Json<MenuPayload>) -> ApiResult<Menu> {
    let data = payload.validate()?;
    let service = MenuService::new().await?;
    let existing = service.find_menu(id).await?;
    let menu = service.save_menu(&data, Some(&existing)).await?;
    Ok(ApiResponse::success("Menu updated successfully", menu))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(title: Option<&str>) -> MenuPayload {
        MenuPayload {
            title: title.map(String::from),
            url: None,
            icon: None,
            parent_id: None,
            order: None,
            is_active: None,
            roles: None,
        }
    }

    #[test]
    fn missing_title_is_rejected_with_field_error() {
        let err = payload(None).validate().unwrap_err();
        let body = err.to_json(false);
        assert_eq!(err.status_code(), 400);
        assert!(body["field_errors"]["title"].is_string());
    }

    #[test]
    fn whitespace_title_is_rejected() {
        assert!(payload(Some("   ")).validate().is_err());
    }

    #[test]
    fn title_is_trimmed_and_defaults_applied() {
        let data = payload(Some("  Dashboard  ")).validate().unwrap();
        assert_eq!(data.title, "Dashboard");
        assert_eq!(data.order, 0);
        assert!(data.is_active);
        assert!(data.roles.is_none());
    }

    #[test]
    fn negative_order_is_rejected() {
        let mut p = payload(Some("Dashboard"));
        p.order = Some(-1);
        let err = p.validate().unwrap_err();
        assert!(err.to_json(false)["field_errors"]["order"].is_string());
    }

    #[test]
    fn overlong_url_is_rejected() {
        let mut p = payload(Some("Dashboard"));
        p.url = Some("x".repeat(300));
        assert!(p.validate().is_err());
    }
}
