//! Offset based pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Maximum page size accepted from clients.
const MAX_PAGE_SIZE: u64 = 500;

/// Request parameters for paginated queries.
///
/// A `limit` of zero means "no limit", matching the storage layer's
/// list operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Maximum number of items, 0 for all.
    #[serde(default)]
    pub limit: u64,
    /// Number of items to skip.
    #[serde(default)]
    pub offset: u64,
}

impl PageRequest {
    /// Create a new page request, clamping the limit.
    pub fn new(limit: u64, offset: u64) -> Self {
        Self {
            limit: limit.min(MAX_PAGE_SIZE),
            offset,
        }
    }

    /// A request for every item.
    pub fn all() -> Self {
        Self::default()
    }

    /// The SQL `LIMIT` value; SQLite treats `-1` as unbounded.
    pub fn sql_limit(&self) -> i64 {
        if self.limit == 0 {
            -1
        } else {
            self.limit as i64
        }
    }

    /// The SQL `OFFSET` value.
    pub fn sql_offset(&self) -> i64 {
        self.offset as i64
    }
}

/// Paginated response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T: Serialize> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Offset of the first item.
    pub offset: u64,
    /// Requested limit, 0 for all.
    pub limit: u64,
    /// Total number of items across all pages.
    pub total: u64,
}

impl<T: Serialize> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            offset: request.offset,
            limit: request.limit,
            total,
        }
    }

    /// Whether more items exist after this page.
    pub fn has_more(&self) -> bool {
        self.offset + (self.items.len() as u64) < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_limit_is_unbounded() {
        let req = PageRequest::all();
        assert_eq!(req.sql_limit(), -1);
        assert_eq!(PageRequest::new(10_000, 5).sql_limit(), MAX_PAGE_SIZE as i64);
    }

    #[test]
    fn test_has_more() {
        let page = PageResponse::new(vec![1, 2], PageRequest::new(2, 0), 3);
        assert!(page.has_more());
        let last = PageResponse::new(vec![3], PageRequest::new(2, 2), 3);
        assert!(!last.has_more());
    }
}
