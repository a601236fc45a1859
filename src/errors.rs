use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Simplified error structure for OpenAPI documentation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Conflict",
    "message": "Insufficient stock for product 550e8400-e29b-41d4-a716-446655440000: requested 10, available 5",
    "request_id": "req-abc123xyz",
    "timestamp": "2024-12-09T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Request", "Conflict")
    #[schema(example = "Not Found")]
    pub error: String,
    /// Human-readable error description
    #[schema(example = "Supplier with ID 550e8400-e29b-41d4-a716-446655440000 not found")]
    pub message: String,
    /// Additional error details (validation errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Units missing to satisfy a stock request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = 5)]
    pub shortfall: Option<i32>,
    /// Unique request identifier for support and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "req-abc123xyz")]
    pub request_id: Option<String>,
    /// ISO 8601 timestamp when error occurred
    #[schema(example = "2024-12-09T10:30:00.000Z")]
    pub timestamp: String,
}

/// Record kinds that can be missing from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum EntityKind {
    Supplier,
    Product,
    Order,
    #[strum(serialize = "Stock movement")]
    StockMovement,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("{entity} with ID {id} not found")]
    NotFound { entity: EntityKind, id: String },

    #[error(
        "Insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    pub fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        ServiceError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Units missing to satisfy the request, for `InsufficientStock` only.
    pub fn shortfall(&self) -> Option<i32> {
        match self {
            Self::InsufficientStock {
                requested,
                available,
                ..
            } => Some(requested.saturating_sub(*available)),
            _ => None,
        }
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidInput(_) | Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::InsufficientStock { .. } | Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Storage and internal errors return generic messages.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::InternalError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        ApiError::ServiceError(self).into_response()
    }
}

/// API Error type for HTTP responses
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, shortfall) = match &self {
            ApiError::ServiceError(service_error) => {
                if service_error.status_code().is_server_error() {
                    tracing::error!(error = %service_error, "request failed");
                }
                (
                    service_error.status_code(),
                    service_error.response_message(),
                    service_error.shortfall(),
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
        };

        let error_response = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string(),
            message: error_message,
            details: None,
            shortfall,
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::StatusCode};

    #[tokio::test]
    async fn service_error_response_includes_request_id() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("req-123"), async {
                ServiceError::not_found(EntityKind::Order, Uuid::nil()).into_response()
            })
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.request_id.as_deref(), Some("req-123"));
        assert_eq!(
            payload.message,
            "Order with ID 00000000-0000-0000-0000-000000000000 not found"
        );
    }

    #[tokio::test]
    async fn insufficient_stock_renders_as_conflict() {
        let response = ServiceError::InsufficientStock {
            product_id: Uuid::nil(),
            requested: 10,
            available: 5,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.error, "Conflict");
        assert!(payload.message.contains("requested 10, available 5"));
        assert_eq!(payload.shortfall, Some(5));
    }

    #[test]
    fn service_error_status_code_mapping() {
        assert_eq!(
            ServiceError::not_found(EntityKind::Supplier, "x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_message_hides_storage_details() {
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("constraint users_pkey".into()))
                .response_message(),
            "Database error"
        );
        assert_eq!(
            ServiceError::InvalidInput("bad date".into()).response_message(),
            "Invalid input: bad date"
        );
    }

    #[test]
    fn shortfall_is_requested_minus_available() {
        let err = ServiceError::InsufficientStock {
            product_id: Uuid::new_v4(),
            requested: 12,
            available: 4,
        };
        assert_eq!(err.shortfall(), Some(8));
        assert_eq!(ServiceError::Conflict("x".into()).shortfall(), None);
    }

    #[test]
    fn entity_kind_display() {
        assert_eq!(EntityKind::StockMovement.to_string(), "Stock movement");
        assert_eq!(EntityKind::Supplier.to_string(), "Supplier");
    }
}
