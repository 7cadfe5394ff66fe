//! Response envelope shared by every upstream endpoint.
//!
//! ```json
//! { "success": true, "data": [...], "pagination": { "currentPage": 1, "totalPages": 4, "total": 37, "pageSize": 10 } }
//! ```

use serde::{Deserialize, Serialize};

use super::ApiError;

/// `{ success, data, pagination?, message? }`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiResponse<T> {
    /// Missing means success; a few endpoints omit it.
    #[serde(default = "default_success")]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

const fn default_success() -> bool {
    true
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            pagination: None,
            message: None,
        }
    }

    /// Take the payload.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Parse` when the envelope has no `data`.
    pub fn into_data(self) -> Result<T, ApiError> {
        self.data
            .ok_or_else(|| ApiError::Parse("response has no data".to_string()))
    }
}

/// Page metadata for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total: u64,
    pub page_size: u32,
}
