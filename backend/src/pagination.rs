//! Pagination and query helpers
//!
//! Provides standardized pagination, sorting, and filtering for list endpoints.

use serde::{Deserialize, Serialize};

use crate::store::{AutomationSort, Page};

/// Default page size if not specified
pub const DEFAULT_PAGE_SIZE: i64 = 25;
/// Maximum allowed page size
pub const MAX_PAGE_SIZE: i64 = 100;
/// Default page number (1-indexed for API consumers)
pub const DEFAULT_PAGE: i64 = 1;

/// Standard pagination query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page
    #[serde(default = "default_per_page")]
    pub per_page: i64,
    /// Sort field
    pub sort_by: Option<String>,
    /// Sort direction (asc/desc)
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_per_page() -> i64 {
    DEFAULT_PAGE_SIZE
}

fn default_sort_order() -> String {
    "desc".to_string()
}

impl PaginationParams {
    /// Get SQL OFFSET value, saturating for absurdly large page numbers
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    /// Get SQL LIMIT value
    pub fn limit(&self) -> i64 {
        self.per_page.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    pub fn is_ascending(&self) -> bool {
        self.sort_order.eq_ignore_ascii_case("asc")
    }

    /// Validate and sanitize sort field against allowed fields
    pub fn validated_sort_field<'a>(&'a self, allowed: &[&str], default: &'a str) -> &'a str {
        self.sort_by
            .as_deref()
            .filter(|s| allowed.contains(s))
            .unwrap_or(default)
    }

    /// Page window for the automations list. Unknown sort fields fall back to `created_at`.
    pub fn automation_page(&self) -> Page {
        let field = self.validated_sort_field(AutomationSort::FIELDS, "created_at");
        Page {
            limit: self.limit(),
            offset: self.offset(),
            sort: AutomationSort::parse(field),
            ascending: self.is_ascending(),
        }
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PAGE_SIZE,
            sort_by: None,
            sort_order: default_sort_order(),
        }
    }
}

/// Pagination metadata returned with list responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginationMeta {
    /// Current page (1-indexed)
    pub page: i64,
    /// Items per page
    pub per_page: i64,
    /// Total number of items
    pub total: i64,
    /// Total number of pages
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let total_pages = (total + per_page - 1) / per_page;
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

/// Standard paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, params: &PaginationParams, total: i64) -> Self {
        Self {
            data,
            meta: PaginationMeta::new(params.page(), params.limit(), total),
        }
    }
}

/// SQL query builder helper for dynamic filtering
#[derive(Debug, Default)]
pub struct QueryBuilder {
    conditions: Vec<String>,
    param_count: usize,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition (returns the parameter placeholder number)
    pub fn add_condition(&mut self, condition: &str) -> usize {
        self.param_count += 1;
        let full_condition = condition.replace("{}", &format!("${}", self.param_count));
        self.conditions.push(full_condition);
        self.param_count
    }

    /// Add condition only if value is Some
    pub fn add_optional<T>(&mut self, condition: &str, value: &Option<T>) -> Option<usize> {
        if value.is_some() {
            Some(self.add_condition(condition))
        } else {
            None
        }
    }

    /// Get the WHERE clause (empty string if no conditions)
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn param_count(&self) -> usize {
        self.param_count
    }
}
