//! Initial catalog contents loaded into an empty store.

use std::path::Path;

use tracing::{info, warn};

use super::{CatalogError, CatalogStore, NewCatalogEntry};

/// Read a JSON array of create bodies.
pub fn load_seed_file(path: &Path) -> Result<Vec<NewCatalogEntry>, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CatalogError::Internal(format!("failed to read seed file {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        CatalogError::Validation(format!("invalid seed file {}: {}", path.display(), e))
    })
}

/// Create every seed entry if the store holds no entries at all.
///
/// Entries go through the regular validated create path. Returns how many
/// were inserted; a non-empty store is left untouched and yields 0.
pub fn seed_if_empty(
    store: &dyn CatalogStore,
    entries: Vec<NewCatalogEntry>,
) -> Result<usize, CatalogError> {
    let existing = store.count_all()?;
    if existing > 0 {
        info!(existing, "Catalog already populated, skipping seed");
        return Ok(0);
    }

    let mut created = 0;
    for entry in entries {
        let title = entry.title.clone();
        match store.create(entry) {
            Ok(_) => created += 1,
            Err(CatalogError::Validation(reason)) => {
                warn!(title = %title, reason = %reason, "Skipping invalid seed entry");
            }
            Err(e) => return Err(e),
        }
    }

    info!(created, "Seeded catalog");
    Ok(created)
}
