//! Query service: criteria in, rows or counts out.

use super::compiler::compile;
use super::page::{Page, PageRequest, Sort};
use crate::criteria::BarCriteria;
use crate::domain::StockBar;
use crate::store::{BarRepository, StoreError};
use std::sync::Arc;

/// Runs filtered queries for stock bars. All filters in the criteria must
/// apply. Holds no state besides its repository, so one instance can serve
/// concurrent requests.
#[derive(Clone)]
pub struct BarQueryService {
    repository: Arc<dyn BarRepository>,
}

impl BarQueryService {
    pub fn new(repository: Arc<dyn BarRepository>) -> Self {
        Self { repository }
    }

    /// Every bar matching the criteria, in storage order unless `sort` is given.
    pub fn find_by_criteria(
        &self,
        criteria: &BarCriteria,
        sort: Option<&Sort>,
    ) -> Result<Vec<StockBar>, StoreError> {
        let predicate = compile(Some(criteria));
        tracing::debug!(%criteria, %predicate, "find by criteria");
        self.repository.find_all(&predicate, sort)
    }

    /// One page of matching bars. The page and its total are computed from the
    /// same compiled predicate.
    pub fn find_page_by_criteria(
        &self,
        criteria: &BarCriteria,
        request: &PageRequest,
    ) -> Result<Page<StockBar>, StoreError> {
        let predicate = compile(Some(criteria));
        tracing::debug!(%criteria, %predicate, page = request.page, size = request.size, "find page by criteria");
        self.repository.find_page(&predicate, request)
    }

    /// Number of bars matching the criteria.
    pub fn count_by_criteria(&self, criteria: &BarCriteria) -> Result<u64, StoreError> {
        let predicate = compile(Some(criteria));
        tracing::debug!(%criteria, %predicate, "count by criteria");
        self.repository.count(&predicate)
    }
}
