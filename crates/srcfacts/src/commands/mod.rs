pub mod dump;
pub mod extract;
pub mod stats;

use std::path::Path;
use std::time::Duration;

use libsrcfacts_core::{FactStore, LockedFactStore, SrcFactsError};

/// How long read-only commands wait for a running extraction to release the database
const READ_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Open an existing fact database for reading
pub fn open_existing_store(db: &Path) -> Result<LockedFactStore, SrcFactsError> {
    if !db.exists() {
        return Err(SrcFactsError::NotFound(format!(
            "No fact database at {}",
            db.display()
        )));
    }
    FactStore::open_locked_blocking(db, READ_LOCK_TIMEOUT)
}
