//! Storage collaborator: the repository trait and its implementations.
//!
//! The query layer only builds predicates; evaluating them, paging, sorting
//! and keeping fetch and count on the same snapshot is the repository's job.

pub mod file;
pub mod memory;

pub use file::FileBarStore;
pub use memory::InMemoryBarStore;

use crate::domain::{BarId, StockBar};
use crate::query::{Page, PageRequest, Predicate, Sort};
use thiserror::Error;

/// Storage failures. Passed through the query and CRUD layers unchanged.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("stored row is missing its id")]
    MissingId,

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Persistence operations for stock bars.
pub trait BarRepository: Send + Sync {
    /// Every row matching `predicate`, in id order unless `sort` is given.
    fn find_all(&self, predicate: &Predicate, sort: Option<&Sort>)
        -> Result<Vec<StockBar>, StoreError>;

    /// One page of matching rows plus the total match count, both taken from
    /// the same snapshot.
    fn find_page(
        &self,
        predicate: &Predicate,
        request: &PageRequest,
    ) -> Result<Page<StockBar>, StoreError>;

    fn count(&self, predicate: &Predicate) -> Result<u64, StoreError>;

    /// Inserts a bar without id (assigning one) or replaces the row with the bar's id.
    fn save(&self, bar: StockBar) -> Result<StockBar, StoreError>;

    /// Replaces the row carrying the bar's id, checked and written as one
    /// step. `None` when the bar has no id or no such row exists; nothing is
    /// stored then.
    fn replace(&self, bar: StockBar) -> Result<Option<StockBar>, StoreError>;

    fn find_by_id(&self, id: BarId) -> Result<Option<StockBar>, StoreError>;

    /// Returns whether a row was removed.
    fn delete_by_id(&self, id: BarId) -> Result<bool, StoreError>;

    fn exists_by_id(&self, id: BarId) -> Result<bool, StoreError> {
        Ok(self.find_by_id(id)?.is_some())
    }
}
