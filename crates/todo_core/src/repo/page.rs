//! Pagination request/response types.
//!
//! # Invariants
//! - Page index is zero-based.
//! - Page size is always within `1..=PAGE_SIZE_MAX`.
//! - Ordering always ends with `id ASC` so slices are stable.

use serde::{Deserialize, Serialize};

pub const PAGE_SIZE_DEFAULT: u32 = 20;
pub const PAGE_SIZE_MAX: u32 = 100;

/// Sortable todo columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Id,
    Description,
    Status,
    CreationDatetime,
    DueDatetime,
    DoneDatetime,
}

impl SortField {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "id" => Some(Self::Id),
            "description" => Some(Self::Description),
            "status" => Some(Self::Status),
            "creationdatetime" | "creation_datetime" => Some(Self::CreationDatetime),
            "duedatetime" | "due_datetime" => Some(Self::DueDatetime),
            "donedatetime" | "done_datetime" => Some(Self::DoneDatetime),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }
}

/// Requested slice of a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Sort,
}

impl PageRequest {
    /// Builds a request with normalized size and default sort.
    pub fn of(page: u32, size: u32) -> Self {
        Self {
            page,
            size: normalize_page_size(Some(size)),
            sort: Sort::default(),
        }
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::of(0, PAGE_SIZE_DEFAULT)
    }
}

/// Normalizes page size: missing or `0` -> default, clamps to max.
pub fn normalize_page_size(size: Option<u32>) -> u32 {
    match size {
        Some(0) | None => PAGE_SIZE_DEFAULT,
        Some(value) if value > PAGE_SIZE_MAX => PAGE_SIZE_MAX,
        Some(value) => value,
    }
}

/// One bounded, ordered slice plus the metadata needed to fetch the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size.max(1));
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages: total_elements.div_ceil(size),
        }
    }

    /// Maps page content, keeping metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) + 1 < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_page_size, Page, PageRequest, SortField, PAGE_SIZE_DEFAULT};

    #[test]
    fn page_size_is_normalized() {
        assert_eq!(normalize_page_size(None), PAGE_SIZE_DEFAULT);
        assert_eq!(normalize_page_size(Some(0)), PAGE_SIZE_DEFAULT);
        assert_eq!(normalize_page_size(Some(7)), 7);
        assert_eq!(normalize_page_size(Some(10_000)), 100);
    }

    #[test]
    fn page_metadata_tracks_neighbours() {
        let request = PageRequest::of(1, 2);
        let page = Page::new(vec![3, 4], &request, 5);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_previous());
        assert!(page.has_next());

        let last = Page::new(vec![5], &PageRequest::of(2, 2), 5);
        assert!(!last.has_next());

        let mapped = page.map(|value| value * 10);
        assert_eq!(mapped.content, vec![30, 40]);
        assert_eq!(mapped.total_elements, 5);
    }

    #[test]
    fn empty_result_has_no_pages() {
        let page: Page<i32> = Page::new(Vec::new(), &PageRequest::default(), 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next());
        assert!(page.is_empty());
    }

    #[test]
    fn sort_field_accepts_wire_and_column_names() {
        assert_eq!(SortField::parse("dueDatetime"), Some(SortField::DueDatetime));
        assert_eq!(SortField::parse("due_datetime"), Some(SortField::DueDatetime));
        assert_eq!(SortField::parse("bogus"), None);
    }
}
