//! Movie and web-series catalog.
//!
//! The catalog owns entry validation, link normalization on write, and the
//! filtered/paginated reads that back the public site.

mod query;
mod seed;
mod sqlite;
mod types;

pub use query::*;
pub use seed::{load_seed_file, seed_if_empty};
pub use sqlite::SqliteCatalog;
pub use types::*;

/// Trait for catalog storage.
pub trait CatalogStore: Send + Sync {
    /// Validate, normalize and persist a new entry.
    ///
    /// The store assigns `id` and `createdAt`; `downloadCount` starts at 0.
    fn create(&self, entry: NewCatalogEntry) -> Result<CatalogEntry, CatalogError>;

    /// Get an entry by id, whether or not it is active.
    fn get(&self, id: &str) -> Result<CatalogEntry, CatalogError>;

    /// Replace every client-editable field of an entry.
    ///
    /// `id`, `createdAt` and `downloadCount` are preserved.
    fn update(&self, id: &str, entry: NewCatalogEntry) -> Result<CatalogEntry, CatalogError>;

    /// Permanently delete an entry.
    fn delete(&self, id: &str) -> Result<(), CatalogError>;

    /// List one page of entries matching the filter, newest first.
    fn list(&self, filter: &CatalogFilter) -> Result<CatalogPage, CatalogError>;

    /// Active entries sharing the language or any genre with `id`, excluding it.
    fn related(&self, id: &str, limit: u32) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Title matches for type-ahead search.
    ///
    /// Returns nothing for queries shorter than [`SUGGESTION_MIN_CHARS`].
    fn suggestions(&self, query: &str, limit: u32) -> Result<Vec<SearchSuggestion>, CatalogError>;

    /// Atomically increment the download counter and return the new value.
    fn record_download(&self, id: &str) -> Result<u64, CatalogError>;

    /// Flip one boolean flag and return the updated entry.
    fn toggle(&self, id: &str, flag: EntryFlag) -> Result<CatalogEntry, CatalogError>;

    /// Distinct filter values across active entries.
    fn filter_options(&self) -> Result<FilterOptions, CatalogError>;

    /// Aggregate counts across active entries.
    fn stats(&self) -> Result<CatalogStats, CatalogError>;

    /// Number of stored entries, active or not.
    fn count_all(&self) -> Result<u64, CatalogError>;
}
