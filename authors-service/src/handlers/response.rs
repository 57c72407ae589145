//! Response types for the authors resource
//!
//! Every success body is a one-key envelope: `{"authors": [...]}`,
//! `{"author": {...}}` or `{"message": "..."}`. [`json_response`] is the
//! single place a body and a status become an HTTP response.
//!
//! # Example
//!
//! ```rust
//! use authors_service::handlers::PaginationMeta;
//!
//! let pagination = PaginationMeta::new(2, 10, 25);
//! assert_eq!(pagination.total_pages, 3);
//! assert!(pagination.has_next);
//! assert!(pagination.has_prev);
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Serialize `body` as JSON with the given status
pub fn json_response<T: Serialize>(body: T, status: StatusCode) -> Response {
    (status, Json(body)).into_response()
}

/// `{"author": ...}` envelope
#[derive(Debug, Clone, Serialize)]
pub struct AuthorResponse<T> {
    /// The author record, with or without its books
    pub author: T,
    #[serde(skip)]
    status: StatusCode,
}

impl<T> AuthorResponse<T> {
    /// 200 response
    pub fn new(author: T) -> Self {
        Self {
            author,
            status: StatusCode::OK,
        }
    }

    /// 201 response for a freshly stored record
    pub fn created(author: T) -> Self {
        Self {
            author,
            status: StatusCode::CREATED,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for AuthorResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        json_response(self, status)
    }
}

/// Pagination metadata for list responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationMeta {
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
    /// Total number of items across all pages
    pub total: u64,
    /// Total number of pages
    pub total_pages: u32,
    /// Whether there is a next page
    pub has_next: bool,
    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Create new pagination metadata
    ///
    /// Automatically calculates `total_pages`, `has_next`, and `has_prev`.
    #[must_use]
    pub fn new(page: u32, per_page: u32, total: u64) -> Self {
        let per_page = per_page.max(1);
        let total_pages = calculate_total_pages(total, per_page);

        Self {
            page,
            per_page,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// Calculate total pages, rounding up
fn calculate_total_pages(total: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page);
    let pages = total.div_ceil(per_page);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// `{"authors": [...]}` envelope, with `pagination` when the list was paged
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorListResponse<T> {
    /// The listed authors
    pub authors: Vec<T>,
    /// Present only for paged listings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
}

impl<T> AuthorListResponse<T> {
    /// Unpaged listing
    pub fn new(authors: Vec<T>) -> Self {
        Self {
            authors,
            pagination: None,
        }
    }

    /// Paged listing
    pub fn paged(authors: Vec<T>, pagination: PaginationMeta) -> Self {
        Self {
            authors,
            pagination: Some(pagination),
        }
    }
}

impl<T: Serialize> IntoResponse for AuthorListResponse<T> {
    fn into_response(self) -> Response {
        json_response(self, StatusCode::OK)
    }
}

/// `{"message": ...}` body for successful operations without a record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl IntoResponse for MessageResponse {
    fn into_response(self) -> Response {
        json_response(self, StatusCode::OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pagination_meta_first_page() {
        let meta = PaginationMeta::new(1, 10, 25);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn test_pagination_meta_last_page() {
        let meta = PaginationMeta::new(3, 10, 25);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_pagination_meta_zero_per_page() {
        let meta = PaginationMeta::new(1, 0, 5);
        assert_eq!(meta.per_page, 1);
        assert_eq!(meta.total_pages, 5);
    }

    #[test]
    fn test_calculate_total_pages_exact() {
        assert_eq!(calculate_total_pages(20, 10), 2);
        assert_eq!(calculate_total_pages(0, 10), 0);
        assert_eq!(calculate_total_pages(1, 10), 1);
    }

    #[test]
    fn test_author_response_status() {
        assert_eq!(AuthorResponse::new(1).status(), StatusCode::OK);
        assert_eq!(AuthorResponse::created(1).status(), StatusCode::CREATED);
        assert_eq!(
            serde_json::to_value(AuthorResponse::created(7)).unwrap(),
            json!({"author": 7})
        );
    }

    #[test]
    fn test_list_response_omits_pagination_when_unpaged() {
        let body = serde_json::to_value(AuthorListResponse::new(vec![1, 2])).unwrap();
        assert_eq!(body, json!({"authors": [1, 2]}));

        let body =
            serde_json::to_value(AuthorListResponse::paged(vec![1], PaginationMeta::new(1, 1, 2)))
                .unwrap();
        assert_eq!(body["pagination"]["total_pages"], 2);
    }

    #[test]
    fn test_json_response_sets_content_type() {
        let response = json_response(MessageResponse::new("ok"), StatusCode::ACCEPTED);
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );
    }
}
