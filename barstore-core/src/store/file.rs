//! JSON-file repository.
//!
//! Rows live in memory and every mutation rewrites the whole file. Writes
//! are atomic: serialize to `{path}.tmp`, then rename into place.

use super::memory::{InMemoryBarStore, Table};
use super::{BarRepository, StoreError};
use crate::domain::{BarId, StockBar};
use crate::query::{Page, PageRequest, Predicate, Sort};
use std::fs;
use std::path::PathBuf;

/// Bar table persisted as a JSON array of rows.
///
/// A mutation is applied to a copy of the table and written out first; the
/// rows served to queries only change once the file is in place.
#[derive(Debug)]
pub struct FileBarStore {
    path: PathBuf,
    rows: InMemoryBarStore,
}

impl FileBarStore {
    /// Opens the store at `path`. A missing file is an empty store; the file
    /// is only created on the first mutation.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let rows = if path.exists() {
            let content = fs::read(&path)?;
            let bars: Vec<StockBar> = if content.iter().all(u8::is_ascii_whitespace) {
                Vec::new()
            } else {
                serde_json::from_slice(&content)?
            };
            InMemoryBarStore::from_rows(bars)?
        } else {
            InMemoryBarStore::new()
        };

        tracing::debug!(path = %path.display(), rows = rows.len()?, "opened bar store");
        Ok(Self { path, rows })
    }

    fn persist(&self, table: &Table) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_vec_pretty(&table.rows())?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            StoreError::Io(e)
        })
    }

    fn mutate<T>(&self, op: impl FnOnce(&mut Table) -> T) -> Result<T, StoreError> {
        self.rows.apply_committed(op, |table| {
            self.persist(table).inspect_err(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "bar store write failed");
            })
        })
    }
}

impl BarRepository for FileBarStore {
    fn find_all(
        &self,
        predicate: &Predicate,
        sort: Option<&Sort>,
    ) -> Result<Vec<StockBar>, StoreError> {
        self.rows.find_all(predicate, sort)
    }

    fn find_page(
        &self,
        predicate: &Predicate,
        request: &PageRequest,
    ) -> Result<Page<StockBar>, StoreError> {
        self.rows.find_page(predicate, request)
    }

    fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        self.rows.count(predicate)
    }

    fn save(&self, bar: StockBar) -> Result<StockBar, StoreError> {
        self.mutate(|table| table.save(bar))
    }

    fn replace(&self, bar: StockBar) -> Result<Option<StockBar>, StoreError> {
        // skip the rewrite when there is nothing to replace
        match bar.id {
            Some(id) if self.rows.exists_by_id(id)? => {}
            _ => return Ok(None),
        }
        self.mutate(|table| table.replace(bar))
    }

    fn find_by_id(&self, id: BarId) -> Result<Option<StockBar>, StoreError> {
        self.rows.find_by_id(id)
    }

    fn delete_by_id(&self, id: BarId) -> Result<bool, StoreError> {
        if !self.rows.exists_by_id(id)? {
            return Ok(false);
        }
        self.mutate(|table| table.delete(id))
    }

    fn exists_by_id(&self, id: BarId) -> Result<bool, StoreError> {
        self.rows.exists_by_id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_opens_empty_and_is_not_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bars.json");
        let store = FileBarStore::open(&path).unwrap();
        assert_eq!(store.count(&Predicate::always()).unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn rows_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/bars.json");
        {
            let store = FileBarStore::open(&path).unwrap();
            store.save(StockBar::new().symbol("AAPL").open(1.0)).unwrap();
            store.save(StockBar::new().symbol("MSFT").open(2.0)).unwrap();
            assert!(store.delete_by_id(BarId(1)).unwrap());
        }

        let reopened = FileBarStore::open(&path).unwrap();
        let rows = reopened.find_all(&Predicate::always(), None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol.as_deref(), Some("MSFT"));

        // sequence resumes after the highest persisted id
        let next = reopened.save(StockBar::new().symbol("IBM")).unwrap();
        assert_eq!(next.id, Some(BarId(3)));
    }

    #[test]
    fn no_tmp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bars.json");
        let store = FileBarStore::open(&path).unwrap();
        store.save(StockBar::new().symbol("AAPL")).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_a_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bars.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            FileBarStore::open(&path),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn blank_file_is_an_empty_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bars.json");
        fs::write(&path, "\n").unwrap();
        let store = FileBarStore::open(&path).unwrap();
        assert_eq!(store.count(&Predicate::always()).unwrap(), 0);
    }

    #[test]
    fn failed_write_leaves_rows_unchanged() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        // the parent "directory" is a regular file, so every write fails
        let store = FileBarStore::open(blocker.join("bars.json")).unwrap();
        assert!(store.save(StockBar::new().symbol("AAPL")).is_err());
        assert_eq!(store.count(&Predicate::always()).unwrap(), 0);
        assert!(!store.exists_by_id(BarId(1)).unwrap());
    }

    #[test]
    fn failed_delete_keeps_the_row() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("sub");
        let store = FileBarStore::open(sub.join("bars.json")).unwrap();
        store.save(StockBar::new().symbol("AAPL")).unwrap();

        fs::remove_dir_all(&sub).unwrap();
        fs::write(&sub, "").unwrap();

        assert!(store.delete_by_id(BarId(1)).is_err());
        assert!(store.exists_by_id(BarId(1)).unwrap());
        assert!(store.replace(StockBar::new().id(1).symbol("MSFT")).is_err());
        assert_eq!(
            store.find_by_id(BarId(1)).unwrap().unwrap().symbol.as_deref(),
            Some("AAPL")
        );
    }

    #[test]
    fn replace_of_missing_row_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bars.json");
        let store = FileBarStore::open(&path).unwrap();
        assert_eq!(store.replace(StockBar::new().id(3).symbol("AAPL")).unwrap(), None);
        assert!(!path.exists());

        store.save(StockBar::new().symbol("AAPL")).unwrap();
        let replaced = store.replace(StockBar::new().id(1).symbol("MSFT")).unwrap();
        assert!(replaced.is_some());
        let reopened = FileBarStore::open(&path).unwrap();
        assert_eq!(
            reopened.find_by_id(BarId(1)).unwrap().unwrap().symbol.as_deref(),
            Some("MSFT")
        );
    }
}
