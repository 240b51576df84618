use axum::Json;
use serde::Deserialize;
use std::collections::HashMap;

use crate::database::models::ReorderEntry;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::menu_service::MenuService;

/// Body for PATCH /api/menus/reorder
#[derive(Debug, Deserialize)]
pub struct ReorderPayload {
    pub orders: Option<Vec<ReorderEntry>>,
}

impl ReorderPayload {
    pub fn validate(self) -> Result<Vec<ReorderEntry>, ApiError> {
        let orders = match self.orders {
            Some(orders) if !orders.is_empty() => orders,
            _ => {
                let mut field_errors = HashMap::new();
                field_errors.insert("orders".into(), "This field is required".into());
                return Err(ApiError::validation_error(
                    "Invalid reorder data",
                    Some(field_errors),
                ));
            }
        };

        let mut field_errors: HashMap<String, String> = HashMap::new();
        for (idx, entry) in orders.iter().enumerate() {
            if entry.order < 0 {
                field_errors.insert(
                    format!("orders.{}.order", idx),
                    "Must be a non-negative integer".into(),
                );
            }
        }

        if !field_errors.is_empty() {
            return Err(ApiError::validation_error(
                "Invalid reorder data",
                Some(field_errors),
            ));
        }

        Ok(orders)
    }
}

/// PATCH /api/menus/reorder - apply a batch of (id, order, parent_id)
/// updates atomically; the caller re-fetches the tree to observe the result
pub async fn reorder_patch(Json(payload): Json<ReorderPayload>) -> ApiResult<()> {
    let orders = payload.validate()?;
    let service = MenuService::new().await?;
    service.reorder_menus(&orders).await?;
    Ok(ApiResponse::message_only("Menus reordered successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn missing_orders_is_rejected() {
        let err = ReorderPayload { orders: None }.validate().unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn empty_orders_is_rejected() {
        let err = ReorderPayload {
            orders: Some(vec![]),
        }
        .validate()
        .unwrap_err();
        assert!(err.to_json(false)["field_errors"]["orders"].is_string());
    }

    #[test]
    fn negative_order_is_flagged_by_index() {
        let payload = ReorderPayload {
            orders: Some(vec![
                ReorderEntry {
                    id: Uuid::new_v4(),
                    order: 1,
                    parent_id: None,
                },
                ReorderEntry {
                    id: Uuid::new_v4(),
                    order: -2,
                    parent_id: None,
                },
            ]),
        };
        let err = payload.validate().unwrap_err();
        let body = err.to_json(false);
        assert!(body["field_errors"]["orders.1.order"].is_string());
        assert!(body["field_errors"].get("orders.0.order").is_none());
    }

    #[test]
    fn valid_payload_passes_through() {
        let id = Uuid::new_v4();
        let parent = Uuid::new_v4();
        let orders = ReorderPayload {
            orders: Some(vec![ReorderEntry {
                id,
                order: 3,
                parent_id: Some(parent),
            }]),
        }
        .validate()
        .unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, id);
        assert_eq!(orders[0].parent_id, Some(parent));
    }
}
