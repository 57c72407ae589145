//! Query parameters for the list operation
//!
//! Listing is unpaged unless the query string names `page` or `per_page`.
//!
//! ```rust
//! use authors_service::handlers::ListQuery;
//!
//! let query = ListQuery::new().with_page(3);
//! assert!(query.is_paged());
//! assert_eq!(query.items_per_page(), 10);
//! assert_eq!(query.pagination().offset, 20);
//! ```

use serde::{Deserialize, Serialize};

use crate::repository::Pagination;

/// Default number of items per page
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Maximum allowed items per page
pub const MAX_PER_PAGE: u32 = 100;

/// Query string of `GET /authors`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Page number (1-indexed). None defaults to 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Number of items per page. None defaults to DEFAULT_PER_PAGE.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

impl ListQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Whether the caller asked for a page instead of the full listing
    #[must_use]
    pub fn is_paged(&self) -> bool {
        self.page.is_some() || self.per_page.is_some()
    }

    /// Get the 1-indexed page number, defaulting to 1
    ///
    /// Page 0 is treated as page 1.
    #[must_use]
    pub fn page_number(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Get the number of items per page, clamped to `1..=MAX_PER_PAGE`
    #[must_use]
    pub fn items_per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    /// Repository pagination for this query
    #[must_use]
    pub fn pagination(&self) -> Pagination {
        Pagination::page(
            u64::from(self.page_number()),
            u64::from(self.items_per_page()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unpaged() {
        let query = ListQuery::new();
        assert!(!query.is_paged());
        assert_eq!(query.page_number(), 1);
        assert_eq!(query.items_per_page(), DEFAULT_PER_PAGE);
    }

    #[test]
    fn test_per_page_is_clamped() {
        assert_eq!(ListQuery::new().with_per_page(500).items_per_page(), 100);
        assert_eq!(ListQuery::new().with_per_page(0).items_per_page(), 1);
    }

    #[test]
    fn test_pagination_conversion() {
        let query = ListQuery::new().with_page(3).with_per_page(5);
        assert_eq!(query.pagination(), Pagination::new(10, 5));
    }

    #[test]
    fn test_deserialize_from_query_string() {
        let query: ListQuery = serde_json::from_value(serde_json::json!({"per_page": 2})).unwrap();
        assert!(query.is_paged());
        assert_eq!(query.page, None);
    }
}
