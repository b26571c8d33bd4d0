use crate::{
    persist, Assignment, Predicate, Result, Row, RowId, Schema, SelectCache, Table, TableInfo,
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tracing::{info, instrument, warn};
use ty::DataType;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("table {0:?} already exists")]
    AlreadyExists(String),
    #[error("table {0:?} does not exist")]
    NotFound(String),
    #[error("{0:?} is not a valid table name")]
    InvalidName(String),
}

/// The collection of all tables, in creation order.
///
/// The catalog owns the backing store and the [`SelectCache`]. Every mutating
/// operation invalidates the cache entries of the table it touched and, when
/// autosave is on, writes a fresh snapshot before returning. If that write
/// fails the operation is rolled back and the catalog is left as it was. A
/// catalog without a path lives in memory only.
#[derive(Debug)]
pub struct Catalog {
    tables: Vec<Table>,
    cache: SelectCache,
    path: Option<PathBuf>,
    autosave: bool,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl Catalog {
    pub fn in_memory() -> Self {
        Self {
            tables: Vec::new(),
            cache: SelectCache::default(),
            path: None,
            autosave: true,
        }
    }

    /// Opens the catalog stored at `path`. A missing or empty store yields an
    /// empty catalog; a malformed one fails with a storage error.
    #[instrument]
    pub fn load(path: &Path) -> Result<Self> {
        let tables = persist::load(path)?;
        info!(tables = tables.len(), "catalog loaded");

        Ok(Self {
            tables,
            cache: SelectCache::default(),
            path: Some(path.to_path_buf()),
            autosave: true,
        })
    }

    /// When disabled, mutations stay in memory until [`Catalog::flush`].
    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    pub fn with_cache(mut self, cache: SelectCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &SelectCache {
        &self.cache
    }

    /// Writes the whole catalog to its store. No-op for in-memory catalogs.
    pub fn save(&self) -> Result<()> {
        if let Some(path) = &self.path {
            persist::save(path, &self.tables)?;
        }
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        self.save()
    }

    pub fn create_table<N, T>(
        &mut self,
        name: &str,
        columns: impl IntoIterator<Item = (N, T)>,
    ) -> Result<&Table>
    where
        N: AsRef<str>,
        T: AsRef<str>,
    {
        if !crate::schema::is_identifier(name) {
            return Err(CatalogError::InvalidName(name.to_string()).into());
        }
        if self.position(name).is_some() {
            return Err(CatalogError::AlreadyExists(name.to_string()).into());
        }

        let schema = Schema::define(columns)?;
        let summary = schema.to_string();
        self.commit(
            name,
            |tables| {
                tables.push(Table::new(name, schema));
                Ok(())
            },
            |_| true,
        )?;
        info!(table = name, schema = %summary, "table created");

        let idx = self.tables.len() - 1;
        Ok(&self.tables[idx])
    }

    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        let idx = self
            .position(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))?;

        self.commit(
            name,
            |tables| {
                tables.remove(idx);
                Ok(())
            },
            |_| true,
        )?;
        info!(table = name, "table dropped");
        Ok(())
    }

    pub fn list_tables(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|table| table.name().as_str())
    }

    pub fn get_table(&self, name: &str) -> Result<&Table> {
        self.position(name)
            .map(|idx| &self.tables[idx])
            .ok_or_else(|| CatalogError::NotFound(name.to_string()).into())
    }

    /// Appends a row given in user column order. Returns the row's new id and
    /// its position.
    pub fn insert(&mut self, name: &str, values: Vec<DataType>) -> Result<(RowId, usize)> {
        let idx = self.index(name)?;
        let (id, position) = self.commit(name, |tables| tables[idx].insert(values), |_| true)?;
        info!(table = name, %id, position, "row inserted");

        Ok((id, position))
    }

    /// Rows of `name` matching `predicate`, served from the [`SelectCache`] when
    /// the table has not changed since the same select last ran.
    pub fn select(&self, name: &str, predicate: Option<&Predicate>) -> Result<Arc<Vec<Row>>> {
        let table = self.get_table(name)?;
        let predicate = predicate
            .map(|predicate| table.normalize(predicate))
            .transpose()?;

        self.cache
            .get_or_compute(name, predicate.as_ref(), table.version(), || {
                Ok(table.select(predicate.as_ref())?.cloned().collect())
            })
    }

    /// Returns the ids of the updated rows.
    pub fn update(
        &mut self,
        name: &str,
        predicate: &Predicate,
        assignment: &Assignment,
    ) -> Result<Vec<RowId>> {
        let idx = self.index(name)?;
        let ids = self.commit(
            name,
            |tables| tables[idx].update(predicate, assignment),
            |ids| !ids.is_empty(),
        )?;
        if !ids.is_empty() {
            info!(table = name, count = ids.len(), %predicate, %assignment, "rows updated");
        }

        Ok(ids)
    }

    /// Returns the ids of the deleted rows.
    pub fn delete(&mut self, name: &str, predicate: Option<&Predicate>) -> Result<Vec<RowId>> {
        let idx = self.index(name)?;
        let ids = self.commit(
            name,
            |tables| tables[idx].delete(predicate),
            |ids| !ids.is_empty(),
        )?;
        if !ids.is_empty() {
            info!(table = name, count = ids.len(), "rows deleted");
        }

        Ok(ids)
    }

    pub fn info(&self, name: &str) -> Result<TableInfo> {
        Ok(self.get_table(name)?.info())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.tables.iter().position(|table| table.name() == name)
    }

    fn index(&self, name: &str) -> Result<usize> {
        self.position(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()).into())
    }

    /// Applies `op` to the tables, then invalidates `name` in the cache and,
    /// with autosave on, writes the store. Nothing is invalidated or written
    /// when `changed` says the result left the tables untouched. A failed
    /// write restores the tables to their state before `op`.
    fn commit<T>(
        &mut self,
        name: &str,
        op: impl FnOnce(&mut Vec<Table>) -> Result<T>,
        changed: impl FnOnce(&T) -> bool,
    ) -> Result<T> {
        let backup = (self.autosave && self.path.is_some()).then(|| self.tables.clone());

        let out = op(&mut self.tables)?;
        if !changed(&out) {
            return Ok(out);
        }
        self.cache.invalidate(name);

        if let Some(backup) = backup {
            if let Err(e) = self.save() {
                warn!(table = name, error = %e, "save failed, rolling back");
                self.tables = backup;
                self.cache.invalidate(name);
                return Err(e);
            }
        }
        Ok(out)
    }
}

impl PartialEq for Catalog {
    fn eq(&self, other: &Self) -> bool {
        self.tables == other.tables
    }
}
