//! CRUD operations with the identity rules: storage assigns ids, callers
//! never choose them on create and must name them on update.

use crate::domain::{BarId, StockBar};
use crate::query::{Page, PageRequest, Predicate};
use crate::store::{BarRepository, StoreError};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("a new bar cannot already have an id (field '{field}')")]
    IdExists { field: &'static str },

    #[error("bar to update has no id")]
    IdNull,

    #[error("bar {0} not found")]
    NotFound(BarId),

    #[error("price field '{field}' must be a finite number")]
    NonFinitePrice { field: &'static str },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    fn id_exists() -> Self {
        ServiceError::IdExists { field: "id" }
    }
}

fn check_prices(bar: &StockBar) -> Result<(), ServiceError> {
    match bar.non_finite_price() {
        Some(field) => Err(ServiceError::NonFinitePrice { field }),
        None => Ok(()),
    }
}

/// Create, read, update, delete and plain listing of stock bars.
#[derive(Clone)]
pub struct BarService {
    repository: Arc<dyn BarRepository>,
}

impl BarService {
    pub fn new(repository: Arc<dyn BarRepository>) -> Self {
        Self { repository }
    }

    /// Persists a new bar and returns it with its assigned id.
    pub fn create(&self, bar: StockBar) -> Result<StockBar, ServiceError> {
        tracing::debug!(?bar, "create bar");
        if bar.is_persisted() {
            return Err(ServiceError::id_exists());
        }
        check_prices(&bar)?;
        Ok(self.repository.save(bar)?)
    }

    /// Replaces the stored row carrying the bar's id.
    pub fn update(&self, bar: StockBar) -> Result<StockBar, ServiceError> {
        tracing::debug!(?bar, "update bar");
        let id = bar.id.ok_or(ServiceError::IdNull)?;
        check_prices(&bar)?;
        self.repository
            .replace(bar)?
            .ok_or(ServiceError::NotFound(id))
    }

    pub fn get(&self, id: BarId) -> Result<StockBar, ServiceError> {
        tracing::debug!(%id, "get bar");
        self.repository
            .find_by_id(id)?
            .ok_or(ServiceError::NotFound(id))
    }

    pub fn delete(&self, id: BarId) -> Result<(), ServiceError> {
        tracing::debug!(%id, "delete bar");
        if self.repository.delete_by_id(id)? {
            Ok(())
        } else {
            Err(ServiceError::NotFound(id))
        }
    }

    /// Unfiltered page of bars.
    pub fn list(&self, request: &PageRequest) -> Result<Page<StockBar>, ServiceError> {
        tracing::debug!(page = request.page, size = request.size, "list bars");
        Ok(self.repository.find_page(&Predicate::always(), request)?)
    }
}
