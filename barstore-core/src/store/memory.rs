//! In-memory repository: rows in a `BTreeMap` keyed by id behind an `RwLock`.

use super::{BarRepository, StoreError};
use crate::domain::{BarId, StockBar};
use crate::query::{Direction, Page, PageRequest, Predicate, Sort};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Rows plus the id sequence.
#[derive(Debug, Clone, Default)]
pub(super) struct Table {
    rows: BTreeMap<BarId, StockBar>,
    last_id: u64,
}

impl Table {
    /// All rows in id order.
    pub(super) fn rows(&self) -> Vec<&StockBar> {
        self.rows.values().collect()
    }

    pub(super) fn save(&mut self, mut bar: StockBar) -> StockBar {
        let id = match bar.id {
            Some(id) => id,
            None => {
                self.last_id += 1;
                BarId(self.last_id)
            }
        };
        self.last_id = self.last_id.max(id.0);
        bar.id = Some(id);
        self.rows.insert(id, bar.clone());
        bar
    }

    pub(super) fn replace(&mut self, bar: StockBar) -> Option<StockBar> {
        let slot = self.rows.get_mut(&bar.id?)?;
        *slot = bar.clone();
        Some(bar)
    }

    pub(super) fn delete(&mut self, id: BarId) -> bool {
        self.rows.remove(&id).is_some()
    }
}

/// Thread-safe in-memory bar table. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct InMemoryBarStore {
    table: RwLock<Table>,
}

impl InMemoryBarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from already persisted rows. The id sequence resumes
    /// after the highest id present.
    pub fn from_rows(rows: impl IntoIterator<Item = StockBar>) -> Result<Self, StoreError> {
        let mut table = Table::default();
        for bar in rows {
            let id = bar.id.ok_or(StoreError::MissingId)?;
            table.last_id = table.last_id.max(id.0);
            table.rows.insert(id, bar);
        }
        Ok(Self {
            table: RwLock::new(table),
        })
    }

    pub(crate) fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.rows.len())
    }

    /// Applies `op` to a copy of the table and hands the copy to `commit`.
    /// The live table only changes once `commit` succeeds; the write guard is
    /// held throughout, so mutations never interleave.
    pub(super) fn apply_committed<T>(
        &self,
        op: impl FnOnce(&mut Table) -> T,
        commit: impl FnOnce(&Table) -> Result<(), StoreError>,
    ) -> Result<T, StoreError> {
        let mut table = self.write()?;
        let mut next = table.clone();
        let out = op(&mut next);
        commit(&next)?;
        *table = next;
        Ok(out)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Table>, StoreError> {
        self.table.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Table>, StoreError> {
        self.table.write().map_err(|_| StoreError::Poisoned)
    }
}

/// Orders two bars by `sort`: nulls first ascending (last descending), ties by id.
fn compare_bars(a: &StockBar, b: &StockBar, sort: &Sort) -> Ordering {
    let left = sort.field.value_of(a);
    let right = sort.field.value_of(b);
    let by_field = match (&left, &right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(l), Some(r)) => l.compare(r).unwrap_or(Ordering::Equal),
    };
    let by_field = match sort.direction {
        Direction::Asc => by_field,
        Direction::Desc => by_field.reverse(),
    };
    by_field.then_with(|| a.id.cmp(&b.id))
}

fn matching<'a>(table: &'a Table, predicate: &Predicate) -> Vec<&'a StockBar> {
    table
        .rows
        .values()
        .filter(|bar| predicate.matches(bar))
        .collect()
}

impl BarRepository for InMemoryBarStore {
    fn find_all(
        &self,
        predicate: &Predicate,
        sort: Option<&Sort>,
    ) -> Result<Vec<StockBar>, StoreError> {
        let table = self.read()?;
        let mut rows = matching(&table, predicate);
        if let Some(sort) = sort {
            rows.sort_by(|a, b| compare_bars(a, b, sort));
        }
        Ok(rows.into_iter().cloned().collect())
    }

    fn find_page(
        &self,
        predicate: &Predicate,
        request: &PageRequest,
    ) -> Result<Page<StockBar>, StoreError> {
        // page and total come from the same read guard
        let table = self.read()?;
        let mut rows = matching(&table, predicate);
        let total = rows.len() as u64;
        if let Some(sort) = &request.sort {
            rows.sort_by(|a, b| compare_bars(a, b, sort));
        }
        let content = rows
            .into_iter()
            .skip(request.offset())
            .take(request.size)
            .cloned()
            .collect();
        Ok(Page::new(content, request, total))
    }

    fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let table = self.read()?;
        Ok(table.rows.values().filter(|bar| predicate.matches(bar)).count() as u64)
    }

    fn save(&self, bar: StockBar) -> Result<StockBar, StoreError> {
        Ok(self.write()?.save(bar))
    }

    fn replace(&self, bar: StockBar) -> Result<Option<StockBar>, StoreError> {
        Ok(self.write()?.replace(bar))
    }

    fn find_by_id(&self, id: BarId) -> Result<Option<StockBar>, StoreError> {
        Ok(self.read()?.rows.get(&id).cloned())
    }

    fn delete_by_id(&self, id: BarId) -> Result<bool, StoreError> {
        Ok(self.write()?.delete(id))
    }

    fn exists_by_id(&self, id: BarId) -> Result<bool, StoreError> {
        Ok(self.read()?.rows.contains_key(&id))
    }
}
