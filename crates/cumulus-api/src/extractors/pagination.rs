//! Pagination query parameter extractor.

use serde::{Deserialize, Serialize};

use cumulus_core::types::pagination::PageRequest;

/// `limit` / `offset` query parameters for list endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaginationParams {
    /// Maximum number of items, 0 or absent for all.
    #[serde(default)]
    pub limit: u64,
    /// Number of items to skip.
    #[serde(default)]
    pub offset: u64,
}

impl PaginationParams {
    /// Converts to a `PageRequest`.
    pub fn into_page_request(self) -> PageRequest {
        PageRequest::new(self.limit, self.offset)
    }
}
