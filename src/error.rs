// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (integrity failures: missing parent, cyclic parent)
    Conflict(String),

    // 500 Internal Server Error; detail is logged and only echoed to the
    // client when error-detail exposure is enabled
    InternalServerError {
        message: String,
        detail: Option<String>,
    },

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError { .. } => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError { message, .. } => message,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to the uniform failure envelope. The `error` field carries
    /// the raw technical detail and is populated only when `expose_details`
    /// is set; `field_errors` accompanies validation failures.
    pub fn to_json(&self, expose_details: bool) -> Value {
        let mut body = json!({
            "success": false,
            "message": self.message(),
        });

        if let ApiError::ValidationError {
            field_errors: Some(field_errors),
            ..
        } = self
        {
            body["field_errors"] = json!(field_errors);
        }

        if expose_details {
            if let ApiError::InternalServerError {
                detail: Some(detail),
                ..
            } = self
            {
                body["error"] = json!(detail);
            }
        }

        body
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>, detail: Option<String>) -> Self {
        ApiError::InternalServerError {
            message: message.into(),
            detail,
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert service-layer errors to ApiError
impl From<crate::database::manager::DatabaseError> for ApiError {
    fn from(err: crate::database::manager::DatabaseError) -> Self {
        use crate::database::manager::DatabaseError;
        match err {
            DatabaseError::ConfigMissing(_) | DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("Database configuration error: {}", err);
                ApiError::service_unavailable("Database is not configured")
            }
            DatabaseError::MigrationError(msg) => {
                tracing::error!("Migration error: {}", msg);
                ApiError::service_unavailable("Service is being updated, please try again later")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return a generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error(
                    "Database error occurred",
                    Some(sqlx_err.to_string()),
                )
            }
        }
    }
}

impl From<crate::services::menu_service::MenuError> for ApiError {
    fn from(err: crate::services::menu_service::MenuError) -> Self {
        use crate::services::menu_service::MenuError;
        match err {
            MenuError::NotFound(msg) => ApiError::not_found(msg),
            MenuError::ParentNotFound(id) => {
                ApiError::conflict(format!("Parent menu not found: {}", id))
            }
            MenuError::CyclicParent(id) => ApiError::conflict(format!(
                "Menu {} cannot be moved under itself or one of its descendants",
                id
            )),
            MenuError::UnknownRoles(ids) => {
                let mut field_errors = HashMap::new();
                field_errors.insert("roles".to_string(), format!("Unknown role ids: {:?}", ids));
                ApiError::validation_error("One or more roles do not exist", Some(field_errors))
            }
            MenuError::Database(db) => db.into(),
            MenuError::Sqlx(sqlx_err) => {
                tracing::error!("Menu query error: {}", sqlx_err);
                ApiError::internal_server_error(
                    "An error occurred while processing your request",
                    Some(sqlx_err.to_string()),
                )
            }
        }
    }
}

impl From<crate::services::role_service::RoleError> for ApiError {
    fn from(err: crate::services::role_service::RoleError) -> Self {
        use crate::services::role_service::RoleError;
        match err {
            RoleError::Database(db) => db.into(),
            RoleError::Sqlx(sqlx_err) => {
                tracing::error!("Role query error: {}", sqlx_err);
                ApiError::internal_server_error(
                    "An error occurred while processing your request",
                    Some(sqlx_err.to_string()),
                )
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let expose = crate::config::config().security.expose_error_details;
        (status, Json(self.to_json(expose))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_carries_field_errors() {
        let mut fields = HashMap::new();
        fields.insert("title".to_string(), "This field is required".to_string());
        let err = ApiError::validation_error("Invalid menu data", Some(fields));

        assert_eq!(err.status_code(), 400);
        let body = err.to_json(false);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("Invalid menu data"));
        assert_eq!(
            body["field_errors"]["title"],
            json!("This field is required")
        );
    }

    #[test]
    fn internal_error_detail_is_suppressed_unless_exposed() {
        let err = ApiError::internal_server_error(
            "Failed to save menu",
            Some("duplicate key value violates unique constraint".to_string()),
        );

        let hidden = err.to_json(false);
        assert!(hidden.get("error").is_none(), "detail leaked: {}", hidden);

        let shown = err.to_json(true);
        assert_eq!(
            shown["error"],
            json!("duplicate key value violates unique constraint")
        );
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = ApiError::not_found("Menu not found");
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_json(true)["message"], json!("Menu not found"));
    }
}
