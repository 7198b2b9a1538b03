//! Listing pages and filter state.

use serde::{Deserialize, Serialize};

use super::business::Business;

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// One page of the business catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    /// Businesses on this page, in server order.
    pub items: Vec<Business>,
    /// 1-based page number that was requested.
    pub page: u32,
    /// Requested page size.
    pub limit: u32,
    /// Total number of businesses in the catalog.
    pub total: u64,
    /// Number of pages reported by the server.
    pub total_pages: u32,
}

impl ListingPage {
    /// Whether no further pages should be requested after this one.
    ///
    /// True when the page came back empty or the server reports this page as
    /// the last (or beyond the last).
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.items.is_empty() || self.page >= self.total_pages
    }
}

/// Search and category filter held by the listing screen.
///
/// Not persisted across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Free-text search query.
    pub query: String,
    /// Category name, or [`ALL_CATEGORIES`].
    pub category: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            query: String::new(),
            category: ALL_CATEGORIES.to_string(),
        }
    }
}

impl FilterState {
    /// Create a filter from a query and category.
    #[must_use]
    pub fn new(query: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            category: category.into(),
        }
    }

    /// Filter that only matches a search query.
    #[must_use]
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Filter that only restricts the category.
    #[must_use]
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }

    /// Trimmed search query, `None` when blank.
    #[must_use]
    pub fn search_query(&self) -> Option<&str> {
        let query = self.query.trim();
        (!query.is_empty()).then_some(query)
    }

    /// Category to filter by, `None` for "All".
    #[must_use]
    pub fn category_filter(&self) -> Option<&str> {
        (self.category != ALL_CATEGORIES && !self.category.is_empty())
            .then_some(self.category.as_str())
    }

    /// True when neither a query nor a category is set.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.search_query().is_none() && self.category_filter().is_none()
    }
}
