//! Page-number pagination shared by every list view.
//!
//! Pages are 1-based. The shop API reports paging as
//! `{"pagination": {"page", "per_page", "total", "total_pages"}}` next to the list; list views
//! accept `?page=` and translate it into the upstream `page`/`per_page` query.

use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, DisplayFromStr, serde_as};

/// `?page=` on a list view. Blank or garbage values mean the first page.
#[serde_as]
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<Option<DisplayFromStr>>")]
    pub page: Option<u32>,
}

impl PageQuery {
    /// The requested page, never below 1.
    #[inline]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

/// Paging metadata as reported by the shop API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "first_page")]
    pub total_pages: u32,
}

fn first_page() -> u32 {
    1
}

impl PageInfo {
    /// Paging for a list that arrived without metadata: everything on one page.
    pub fn single(count: usize) -> Self {
        Self {
            page: 1,
            per_page: count as u32,
            total: count as u64,
            total_pages: 1,
        }
    }
}

/// A page of list results.
#[derive(Debug, Clone, Deserialize)]
pub struct PagedList<T> {
    #[serde(default = "Vec::new", alias = "data")]
    pub items: Vec<T>,
    #[serde(default)]
    pub pagination: Option<PageInfo>,
}

impl<T> PagedList<T> {
    pub fn page_info(&self) -> PageInfo {
        self.pagination.clone().unwrap_or_else(|| PageInfo::single(self.items.len()))
    }
}
