//! Paged and unpaged result shapes.

use crate::domain::query::PageRequest;
use serde::Serialize;
use utoipa::ToSchema;

/// A bounded slice of a larger ordered result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: usize,
    pub size: usize,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// `size` must be non-zero; stores reject zero-sized requests before building a page.
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        let size = request.size.max(1) as u64;
        Self {
            content,
            number: request.page,
            size: request.size,
            total_elements,
            total_pages: total_elements.div_ceil(size),
        }
    }

    pub fn info(&self) -> PageInfo {
        PageInfo {
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub number: usize,
    pub size: usize,
    pub total_elements: u64,
    pub total_pages: u64,
}

/// One shape for listing and search results: the rows plus paging metadata when the query
/// was paginated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet<T> {
    pub content: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging: Option<PageInfo>,
}

impl<T> ResultSet<T> {
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl<T> From<Vec<T>> for ResultSet<T> {
    fn from(content: Vec<T>) -> Self {
        Self {
            content,
            paging: None,
        }
    }
}

impl<T> From<Page<T>> for ResultSet<T> {
    fn from(page: Page<T>) -> Self {
        let paging = Some(page.info());
        Self {
            content: page.content,
            paging,
        }
    }
}
