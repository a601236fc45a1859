use crate::errors::ApiError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(format!("Validation failed: {}", e)))
}

/// Pagination parameters for list operations
#[derive(Debug, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number, 1-based (default: 1)
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page (default and cap come from configuration)
    pub per_page: Option<u64>,
}

fn default_page() -> u64 {
    1
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: None,
        }
    }
}

impl PaginationParams {
    /// Resolves `(page, per_page)`, with `per_page` clamped to `1..=max_per_page`.
    ///
    /// `page` is capped so the row offset `(page - 1) * per_page` stays within `i64`.
    pub fn resolve(&self, default_per_page: u64, max_per_page: u64) -> (u64, u64) {
        let max_per_page = max_per_page.max(1);
        let per_page = self
            .per_page
            .unwrap_or(default_per_page)
            .clamp(1, max_per_page);
        let last_page = i64::MAX as u64 / per_page;
        (self.page.clamp(1, last_page), per_page)
    }
}

/// Standard pagination response metadata
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        let total_pages = if total == 0 || per_page == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

/// Standard paginated response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(page, per_page, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(PaginationMeta::new(1, 20, 0).total_pages, 0);
        assert_eq!(PaginationMeta::new(1, 20, 20).total_pages, 1);
        assert_eq!(PaginationMeta::new(1, 20, 21).total_pages, 2);
    }

    #[test]
    fn per_page_is_clamped_to_the_configured_cap() {
        let params = PaginationParams {
            page: 0,
            per_page: Some(5_000),
        };
        assert_eq!(params.resolve(20, 100), (1, 100));

        let params = PaginationParams {
            page: 3,
            per_page: Some(0),
        };
        assert_eq!(params.resolve(20, 100), (3, 1));

        assert_eq!(PaginationParams::default().resolve(20, 100), (1, 20));
    }

    #[test]
    fn huge_page_numbers_keep_the_offset_in_range() {
        let params = PaginationParams {
            page: u64::MAX,
            per_page: Some(50),
        };
        let (page, per_page) = params.resolve(20, 100);
        assert_eq!(per_page, 50);
        assert!((page - 1).checked_mul(per_page).is_some_and(|offset| offset <= i64::MAX as u64));

        let params = PaginationParams {
            page: u64::MAX,
            per_page: Some(1),
        };
        assert_eq!(params.resolve(20, 100).0, i64::MAX as u64);
    }
}
