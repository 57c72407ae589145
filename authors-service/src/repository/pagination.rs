//! Pagination types for repository queries

/// Pagination parameters for limiting query results
///
/// # Example
///
/// ```rust
/// use authors_service::repository::Pagination;
///
/// let page3 = Pagination::page(3, 10);
/// assert_eq!(page3.offset, 20);
/// assert_eq!(page3.limit, 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Number of results to skip
    pub offset: u64,
    /// Maximum number of results to return
    pub limit: u64,
}

impl Pagination {
    /// Create new pagination parameters
    #[must_use]
    pub const fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// Create pagination for a specific page number (1-indexed)
    #[must_use]
    pub const fn page(page_number: u64, page_size: u64) -> Self {
        Self::new(page_number.saturating_sub(1) * page_size, page_size)
    }
}

/// One page of results plus the total row count it was cut from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Total number of rows across all pages
    pub total: u64,
}

impl<T> Page<T> {
    /// Create a page
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    /// Whether this page holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_zero_is_first_page() {
        assert_eq!(Pagination::page(0, 10), Pagination::new(0, 10));
        assert_eq!(Pagination::page(1, 10), Pagination::new(0, 10));
    }

    #[test]
    fn test_page_is_empty() {
        let page: Page<u8> = Page::new(vec![], 4);
        assert!(page.is_empty());
        assert_eq!(page.total, 4);
    }
}
