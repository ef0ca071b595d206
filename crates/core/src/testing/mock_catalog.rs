//! Mock catalog for testing.

use std::sync::Mutex;

use crate::catalog::{
    CatalogEntry, CatalogError, CatalogFilter, CatalogPage, CatalogStats, CatalogStore, EntryFlag,
    FilterOptions, NewCatalogEntry, SearchSuggestion, SqliteCatalog,
};

/// Catalog backed by an in-memory SQLite store that can be told to fail.
///
/// While a failure is set, every operation returns
/// [`CatalogError::Database`] with the configured message and the call is
/// counted in [`MockCatalog::failed_calls`].
pub struct MockCatalog {
    inner: SqliteCatalog,
    failure: Mutex<Option<String>>,
    failed_calls: Mutex<usize>,
}

impl MockCatalog {
    /// Create an empty mock catalog.
    ///
    /// # Panics
    ///
    /// Panics if the in-memory database cannot be opened.
    pub fn new() -> Self {
        Self {
            inner: SqliteCatalog::in_memory().expect("in-memory catalog"),
            failure: Mutex::new(None),
            failed_calls: Mutex::new(0),
        }
    }

    /// Make every following operation fail with a database error.
    pub fn set_failure(&self, message: &str) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.to_string());
    }

    /// Clear any configured failure.
    pub fn clear_failure(&self) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Number of operations rejected because of a configured failure.
    pub fn failed_calls(&self) -> usize {
        *self.failed_calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self) -> Result<(), CatalogError> {
        let failure = self.failure.lock().unwrap_or_else(|e| e.into_inner());
        match failure.as_ref() {
            Some(message) => {
                *self.failed_calls.lock().unwrap_or_else(|e| e.into_inner()) += 1;
                Err(CatalogError::Database(message.clone()))
            }
            None => Ok(()),
        }
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore for MockCatalog {
    fn create(&self, entry: NewCatalogEntry) -> Result<CatalogEntry, CatalogError> {
        self.check()?;
        self.inner.create(entry)
    }

    fn get(&self, id: &str) -> Result<CatalogEntry, CatalogError> {
        self.check()?;
        self.inner.get(id)
    }

    fn update(&self, id: &str, entry: NewCatalogEntry) -> Result<CatalogEntry, CatalogError> {
        self.check()?;
        self.inner.update(id, entry)
    }

    fn delete(&self, id: &str) -> Result<(), CatalogError> {
        self.check()?;
        self.inner.delete(id)
    }

    fn list(&self, filter: &CatalogFilter) -> Result<CatalogPage, CatalogError> {
        self.check()?;
        self.inner.list(filter)
    }

    fn related(&self, id: &str, limit: u32) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.check()?;
        self.inner.related(id, limit)
    }

    fn suggestions(&self, query: &str, limit: u32) -> Result<Vec<SearchSuggestion>, CatalogError> {
        self.check()?;
        self.inner.suggestions(query, limit)
    }

    fn record_download(&self, id: &str) -> Result<u64, CatalogError> {
        self.check()?;
        self.inner.record_download(id)
    }

    fn toggle(&self, id: &str, flag: EntryFlag) -> Result<CatalogEntry, CatalogError> {
        self.check()?;
        self.inner.toggle(id, flag)
    }

    fn filter_options(&self) -> Result<FilterOptions, CatalogError> {
        self.check()?;
        self.inner.filter_options()
    }

    fn stats(&self) -> Result<CatalogStats, CatalogError> {
        self.check()?;
        self.inner.stats()
    }

    fn count_all(&self) -> Result<u64, CatalogError> {
        self.check()?;
        self.inner.count_all()
    }
}
