//! Page-number pagination for catalog listings

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Requested page (1-based) and its size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Page numbers below 1 become 1, a zero page size becomes 1
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

/// One page of an ordered listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of entries across all pages
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
        }
    }

    /// Slice an already ordered collection
    pub fn from_sorted(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as i64;
        let items = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.page_size as usize)
            .collect();
        Self::new(items, total, request)
    }

    pub fn num_pages(&self) -> i64 {
        let size = i64::from(self.page_size);
        (self.total + size - 1) / size
    }

    pub fn has_next(&self) -> bool {
        i64::from(self.page) < self.num_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }

    pub fn info(&self) -> PageInfo {
        PageInfo {
            number: self.page,
            page_size: self.page_size,
            num_pages: self.num_pages(),
            count: self.total,
            has_next: self.has_next(),
            has_previous: self.has_previous(),
        }
    }
}

/// Pagination metadata exposed to the presentation layer as `page_obj`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageInfo {
    pub number: u32,
    pub page_size: u32,
    pub num_pages: i64,
    /// Total number of entries
    pub count: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// `?page=&page_size=` query string. Values that do not parse are ignored.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number, starting at 1
    pub page: Option<String>,
    /// Entries per page
    pub page_size: Option<String>,
}

impl PageQuery {
    pub fn to_request(&self, default_size: u32, max_size: u32) -> PageRequest {
        let page = self
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .unwrap_or(1);
        let page_size = self
            .page_size
            .as_deref()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|s| *s > 0)
            .unwrap_or(default_size)
            .min(max_size.max(1));
        PageRequest::new(page, page_size)
    }
}
