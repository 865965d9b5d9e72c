use serde::Deserialize;

use super::error::{ApiError, ApiResponse};

/// Number of questions per page, shared through the router state.
#[derive(Debug, Clone, Copy)]
pub struct PageSize(pub u32);

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

/// 1-based page of an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    /// Page numbers below 1 are treated as the first page.
    pub fn new(number: u32, size: PageSize) -> Self {
        Self {
            number: number.max(1),
            size: size.0.max(1),
        }
    }

    pub fn from_query(query: &PageQuery, size: PageSize) -> Self {
        Self::new(query.page.unwrap_or(1), size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.size)
    }
}

/// An empty page means the client asked past the last page.
pub fn require_non_empty<T>(items: Vec<T>) -> ApiResponse<Vec<T>> {
    if items.is_empty() {
        Err(ApiError::NotFound)
    } else {
        Ok(items)
    }
}
