use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use serde::Serialize;
use tracing::debug;

use crate::error::SrcFactsError;
use crate::sink::TupleSink;
use crate::types::{Relation, Tuple};

/// Statistics about the fact database
#[derive(Debug, Serialize)]
pub struct StoreStats {
    pub path: String,
    pub size_bytes: u64,
    pub tuple_count: usize,
    /// Tuple count per relation name
    pub relations: BTreeMap<String, usize>,
}

/// A FactStore with filesystem-level exclusive lock.
///
/// The lock is held for the lifetime of this struct and released when
/// dropped, so two extractions never write the same sled database.
pub struct LockedFactStore {
    /// Lock file handle - flock released on drop
    _lock_file: File,
    store: FactStore,
}

impl std::fmt::Debug for LockedFactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockedFactStore")
            .field("path", &self.store.path)
            .finish()
    }
}

impl std::ops::Deref for LockedFactStore {
    type Target = FactStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

impl TupleSink for LockedFactStore {
    fn emit(&self, tuple: Tuple) -> Result<(), SrcFactsError> {
        self.store.emit(tuple)
    }
}

/// Fact database backed by sled, one tree per relation
pub struct FactStore {
    path: PathBuf,
    db: sled::Db,
    files: sled::Tree,
    folders: sled::Tree,
    container_parent: sled::Tree,
    num_lines: sled::Tree,
    file_extraction_mode: sled::Tree,
}

impl FactStore {
    /// Open or create a store at the given path
    pub fn open(path: &Path) -> Result<Self, SrcFactsError> {
        let db = sled::open(path)?;
        let files = db.open_tree(Relation::Files.as_str())?;
        let folders = db.open_tree(Relation::Folders.as_str())?;
        let container_parent = db.open_tree(Relation::ContainerParent.as_str())?;
        let num_lines = db.open_tree(Relation::NumLines.as_str())?;
        let file_extraction_mode = db.open_tree(Relation::FileExtractionMode.as_str())?;

        Ok(Self {
            path: path.to_path_buf(),
            db,
            files,
            folders,
            container_parent,
            num_lines,
            file_extraction_mode,
        })
    }

    /// Open store with exclusive filesystem lock (non-blocking).
    ///
    /// Lock file is created at `<path>.lock`.
    /// Returns `SrcFactsError::DbBusy` if another process holds the lock.
    pub fn open_locked(path: &Path) -> Result<LockedFactStore, SrcFactsError> {
        let lock_file = create_lock_file(path)?;

        lock_file.try_lock_exclusive().map_err(|e| {
            SrcFactsError::DbBusy(format!("Database locked by another process: {}", e))
        })?;

        let store = Self::open(path)?;
        Ok(LockedFactStore {
            _lock_file: lock_file,
            store,
        })
    }

    /// Open store with exclusive filesystem lock, retrying with backoff until `timeout`.
    pub fn open_locked_blocking(
        path: &Path,
        timeout: Duration,
    ) -> Result<LockedFactStore, SrcFactsError> {
        let lock_file = create_lock_file(path)?;

        let start = Instant::now();
        let mut delay = Duration::from_millis(10);

        loop {
            match lock_file.try_lock_exclusive() {
                Ok(()) => break,
                Err(_) if start.elapsed() < timeout => {
                    std::thread::sleep(delay);
                    delay = (delay * 2).min(Duration::from_millis(200));
                }
                Err(e) => {
                    return Err(SrcFactsError::DbBusy(format!(
                        "Timeout waiting for database lock: {}",
                        e
                    )))
                }
            }
        }

        let store = Self::open(path)?;
        Ok(LockedFactStore {
            _lock_file: lock_file,
            store,
        })
    }

    /// Store a tuple in its relation's tree
    pub fn insert(&self, tuple: &Tuple) -> Result<(), SrcFactsError> {
        let key = self.tuple_key(tuple)?;
        let value = serde_json::to_vec(tuple)?;
        self.tree(tuple.relation()).insert(key, value)?;
        Ok(())
    }

    /// All tuples of one relation, in key order
    pub fn tuples(&self, relation: Relation) -> Result<Vec<Tuple>, SrcFactsError> {
        let mut tuples = Vec::new();
        for result in self.tree(relation).iter() {
            let (_, value) = result?;
            tuples.push(serde_json::from_slice(&value)?);
        }
        Ok(tuples)
    }

    /// All tuples of every relation
    pub fn all_tuples(&self) -> Result<Vec<Tuple>, SrcFactsError> {
        let mut tuples = Vec::new();
        for relation in Relation::ALL {
            tuples.extend(self.tuples(relation)?);
        }
        Ok(tuples)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<StoreStats, SrcFactsError> {
        let mut relations = BTreeMap::new();
        let mut tuple_count = 0;
        for relation in Relation::ALL {
            let count = self.tree(relation).len();
            tuple_count += count;
            relations.insert(relation.as_str().to_string(), count);
        }

        Ok(StoreStats {
            path: self.path.to_string_lossy().to_string(),
            size_bytes: dir_size(&self.path).unwrap_or(0),
            tuple_count,
            relations,
        })
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> Result<(), SrcFactsError> {
        self.db.flush()?;
        Ok(())
    }

    fn tree(&self, relation: Relation) -> &sled::Tree {
        match relation {
            Relation::Files => &self.files,
            Relation::Folders => &self.folders,
            Relation::ContainerParent => &self.container_parent,
            Relation::NumLines => &self.num_lines,
            Relation::FileExtractionMode => &self.file_extraction_mode,
        }
    }

    fn tuple_key(&self, tuple: &Tuple) -> Result<Vec<u8>, SrcFactsError> {
        let mut key = tuple.subject().as_str().as_bytes().to_vec();
        match tuple {
            Tuple::ContainerParent { parent, .. } => {
                key.push(0);
                key.extend_from_slice(parent.as_str().as_bytes());
            }
            // A file can have several syntax units, each with its own line counts
            Tuple::NumLines { .. } => {
                key.push(0);
                key.extend_from_slice(&self.db.generate_id()?.to_be_bytes());
            }
            _ => {}
        }
        Ok(key)
    }
}

impl TupleSink for FactStore {
    fn emit(&self, tuple: Tuple) -> Result<(), SrcFactsError> {
        debug!(relation = tuple.relation().as_str(), subject = %tuple.subject(), "emit");
        self.insert(&tuple)
    }
}

fn create_lock_file(path: &Path) -> Result<File, SrcFactsError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(File::create(path.with_extension("lock"))?)
}

fn dir_size(path: &Path) -> std::io::Result<u64> {
    let mut size = 0;
    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            if meta.is_dir() {
                size += dir_size(&entry.path())?;
            } else {
                size += meta.len();
            }
        }
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_counter::LineCounts;
    use crate::types::{ExtractionMode, Key};
    use tempfile::tempdir;

    fn files_tuple(path: &str) -> Tuple {
        Tuple::Files {
            file: Key::source_file(path),
            display_path: path.to_string(),
            name: "a".to_string(),
            extension: "cs".to_string(),
        }
    }

    #[test]
    fn test_store_insert_and_read_back() {
        let dir = tempdir().unwrap();
        let store = FactStore::open(dir.path()).unwrap();

        store.emit(files_tuple("/src/a.cs")).unwrap();
        store
            .emit(Tuple::FileExtractionMode {
                file: Key::source_file("/src/a.cs"),
                mode: ExtractionMode::Integrated,
            })
            .unwrap();

        let files = store.tuples(Relation::Files).unwrap();
        assert_eq!(files, vec![files_tuple("/src/a.cs")]);
        assert_eq!(store.tuples(Relation::FileExtractionMode).unwrap().len(), 1);
        assert!(store.tuples(Relation::Folders).unwrap().is_empty());
    }

    #[test]
    fn test_store_same_fact_is_stored_once() {
        let dir = tempdir().unwrap();
        let store = FactStore::open(dir.path()).unwrap();

        store.emit(files_tuple("/src/a.cs")).unwrap();
        store.emit(files_tuple("/src/a.cs")).unwrap();

        assert_eq!(store.tuples(Relation::Files).unwrap().len(), 1);
    }

    #[test]
    fn test_store_keeps_line_counts_per_unit() {
        let dir = tempdir().unwrap();
        let store = FactStore::open(dir.path()).unwrap();
        let counts = LineCounts {
            total: 3,
            code: 2,
            comment: 1,
        };

        for _ in 0..2 {
            store
                .emit(Tuple::NumLines {
                    file: Key::source_file("/src/a.cs"),
                    counts,
                })
                .unwrap();
        }

        assert_eq!(store.tuples(Relation::NumLines).unwrap().len(), 2);
    }

    #[test]
    fn test_store_stats() {
        let dir = tempdir().unwrap();
        let store = FactStore::open(dir.path()).unwrap();
        store.emit(files_tuple("/src/a.cs")).unwrap();
        store.emit(files_tuple("/src/b.cs")).unwrap();
        store.flush().unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.tuple_count, 2);
        assert_eq!(stats.relations["files"], 2);
        assert_eq!(stats.relations["num_lines"], 0);
    }

    #[test]
    fn test_locked_store_creates_lock_file() {
        let dir = tempdir().unwrap();
        let store_path = dir.path().join("facts");
        let lock_path = dir.path().join("facts.lock");

        assert!(!lock_path.exists());
        let _store = FactStore::open_locked(&store_path).unwrap();
        assert!(lock_path.exists());
    }

    #[test]
    fn test_locked_store_second_open_fails() {
        let dir = tempdir().unwrap();
        let store_path = dir.path().join("facts");

        let _store1 = FactStore::open_locked(&store_path).unwrap();

        let result = FactStore::open_locked(&store_path);
        match result {
            Err(SrcFactsError::DbBusy(msg)) => assert!(msg.contains("locked")),
            other => panic!("Expected DbBusy error, got {:?}", other),
        }
    }

    #[test]
    fn test_locked_store_released_on_drop() {
        let dir = tempdir().unwrap();
        let store_path = dir.path().join("facts");

        {
            let _store = FactStore::open_locked(&store_path).unwrap();
        }

        let _store2 = FactStore::open_locked(&store_path).unwrap();
    }

    #[test]
    fn test_locked_store_blocking_timeout() {
        let dir = tempdir().unwrap();
        let store_path = dir.path().join("facts");

        let _store1 = FactStore::open_locked(&store_path).unwrap();

        let result = FactStore::open_locked_blocking(&store_path, Duration::from_millis(50));
        match result {
            Err(SrcFactsError::DbBusy(msg)) => assert!(msg.contains("Timeout")),
            other => panic!("Expected DbBusy timeout error, got {:?}", other),
        }
    }

    #[test]
    fn test_locked_store_is_a_sink() {
        let dir = tempdir().unwrap();
        let store = FactStore::open_locked(&dir.path().join("facts")).unwrap();

        store.emit(files_tuple("/src/a.cs")).unwrap();
        assert_eq!(store.tuples(Relation::Files).unwrap().len(), 1);
    }
}
