// ABOUTME: Pagination utilities for list endpoints
// ABOUTME: Provides standardized query parameters and response wrappers

use serde::{Deserialize, Deserializer, Serialize};

/// Default page size for paginated listings
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size to prevent performance issues
pub const MAX_PAGE_SIZE: i64 = 100;

/// Minimum page number (1-indexed)
pub const MIN_PAGE: i64 = 1;

/// Highest page number honoured; keeps `page * limit` far from overflowing
pub const MAX_PAGE: i64 = 1_000_000;

/// Query parameters for pagination
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    /// Page number (1-indexed, defaults to 1)
    #[serde(default = "default_page", deserialize_with = "lenient_page")]
    pub page: i64,

    /// Items per page; endpoints pick the default when absent
    #[serde(default, deserialize_with = "docuapp_core::lenient_option")]
    pub limit: Option<i64>,
}

fn default_page() -> i64 {
    MIN_PAGE
}

fn lenient_page<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(docuapp_core::lenient_option(deserializer)?.unwrap_or(MIN_PAGE))
}

impl PaginationParams {
    pub fn new() -> Self {
        Self {
            page: MIN_PAGE,
            limit: None,
        }
    }

    pub fn with_page_and_limit(page: i64, limit: i64) -> Self {
        Self {
            page,
            limit: Some(limit),
        }
    }

    /// Use `default` as the page size unless the caller asked for one
    pub fn with_default_limit(mut self, default: i64) -> Self {
        self.limit.get_or_insert(default);
        self
    }

    /// Validate and normalize pagination parameters
    /// Returns (limit, offset) suitable for SQL queries
    pub fn validate(&self) -> (i64, i64) {
        let page = self.page();
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1) * limit;

        (limit, offset)
    }

    pub fn limit(&self) -> i64 {
        self.validate().0
    }

    pub fn offset(&self) -> i64 {
        self.validate().1
    }

    pub fn page(&self) -> i64 {
        self.page.clamp(MIN_PAGE, MAX_PAGE)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Metadata about pagination state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PaginationMeta {
    pub fn new(params: &PaginationParams, total_items: i64) -> Self {
        let page = params.page();
        let page_size = params.limit();
        let total_pages = if page_size > 0 {
            (total_items + page_size - 1) / page_size
        } else {
            0
        };

        Self {
            page,
            page_size,
            total_items,
            total_pages,
            has_next_page: page < total_pages,
            has_previous_page: page > MIN_PAGE,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, params: &PaginationParams, total_items: i64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(params, total_items),
        }
    }
}
