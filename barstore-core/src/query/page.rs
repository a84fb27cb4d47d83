//! Paging and sort descriptions handed to the storage collaborator.

use crate::criteria::BarField;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// Single-field sort. Ties are broken by ascending id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: BarField,
    pub direction: Direction,
}

impl Sort {
    pub fn asc(field: BarField) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: BarField) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        write!(f, "{},{dir}", self.field)
    }
}

/// Zero-based page number plus page size, with an optional sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
    pub sort: Option<Sort>,
}

impl PageRequest {
    pub const DEFAULT_SIZE: usize = 20;

    pub fn new(page: usize, size: usize) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Number of matching rows to skip before this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_SIZE)
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(self.size as u64)
    }

    pub fn has_next(&self) -> bool {
        (self.page as u64 + 1) < self.total_pages()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_page_times_size() {
        assert_eq!(PageRequest::new(0, 20).offset(), 0);
        assert_eq!(PageRequest::new(3, 20).offset(), 60);
        assert_eq!(PageRequest::new(usize::MAX, 2).offset(), usize::MAX);
    }

    #[test]
    fn total_pages_rounds_up() {
        let request = PageRequest::new(0, 10);
        assert_eq!(Page::<u8>::new(vec![], &request, 0).total_pages(), 0);
        assert_eq!(Page::<u8>::new(vec![], &request, 10).total_pages(), 1);
        assert_eq!(Page::<u8>::new(vec![], &request, 11).total_pages(), 2);
    }

    #[test]
    fn has_next_on_all_but_last_page() {
        let first = Page::<u8>::new(vec![1], &PageRequest::new(0, 1), 2);
        let last = Page::<u8>::new(vec![2], &PageRequest::new(1, 1), 2);
        assert!(first.has_next());
        assert!(!last.has_next());
    }

    #[test]
    fn sort_displays_as_query_parameter() {
        assert_eq!(Sort::desc(BarField::Id).to_string(), "id,desc");
        assert_eq!(Sort::asc(BarField::Date).to_string(), "date,asc");
    }
}
