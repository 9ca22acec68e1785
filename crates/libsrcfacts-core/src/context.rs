//! Per-run extraction context and population driver

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, info};

use crate::archive::SourceArchive;
use crate::cache::EntityCache;
use crate::compilation::Compilation;
use crate::config::ExtractorConfig;
use crate::entities::{Entity, File, Folder};
use crate::error::SrcFactsError;
use crate::sink::TupleSink;
use crate::types::{Key, Tuple};

/// Counters from a population pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PopulationStats {
    /// Entities whose facts were emitted
    pub populated: usize,
    /// Entities not needed by the run, or whose key was already populated
    pub skipped: usize,
}

/// Entity caches of one run
#[derive(Debug, Default)]
pub(crate) struct Caches {
    /// Keyed by database ID; `None` is the path-less file
    pub(crate) files: EntityCache<Option<String>, File>,
    pub(crate) generated: EntityCache<(), File>,
    pub(crate) folders: EntityCache<String, Folder>,
}

/// Everything one extraction run shares: configuration, the compilation,
/// the fact sink, the archive and the entity caches.
///
/// Passed explicitly to entity construction and population.
pub struct Context {
    config: ExtractorConfig,
    compilation: Compilation,
    sink: Arc<dyn TupleSink>,
    archive: Option<SourceArchive>,
    pub(crate) caches: Caches,
    /// Entities created since the driver last drained the queue
    pending: Mutex<Vec<Arc<dyn Entity>>>,
    /// Keys the driver has already handed to `populate`
    populated: Mutex<HashSet<Key>>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("units", &self.compilation.len())
            .field("files", &self.caches.files.len())
            .field("folders", &self.caches.folders.len())
            .finish()
    }
}

impl Context {
    /// Create a context; archiving is enabled when the config names an archive directory.
    pub fn new(
        config: ExtractorConfig,
        compilation: Compilation,
        sink: Arc<dyn TupleSink>,
    ) -> Self {
        let archive = config.archive_dir.as_ref().map(SourceArchive::new);
        Self {
            config,
            compilation,
            sink,
            archive,
            caches: Caches::default(),
            pending: Mutex::new(Vec::new()),
            populated: Mutex::new(HashSet::new()),
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn compilation(&self) -> &Compilation {
        &self.compilation
    }

    pub fn archive(&self) -> Option<&SourceArchive> {
        self.archive.as_ref()
    }

    /// Send staged facts to the sink
    pub fn emit_all(&self, tuples: Vec<Tuple>) -> Result<(), SrcFactsError> {
        self.sink.emit_all(tuples)
    }

    /// Number of distinct file entities created so far (excluding the generated file)
    pub fn file_count(&self) -> usize {
        self.caches.files.len()
    }

    pub fn folder_count(&self) -> usize {
        self.caches.folders.len()
    }

    /// Fetch or create an entity and queue it for the driver when new.
    pub(crate) fn intern<K, V, F>(&self, cache: &EntityCache<K, V>, key: K, create: F) -> Arc<V>
    where
        K: Eq + Hash,
        V: Entity + 'static,
        F: FnOnce() -> V,
    {
        let (entity, created) = cache.get_or_create(key, create);
        if created {
            debug!(key = %entity.key(), "created entity");
            let queued: Arc<dyn Entity> = entity.clone();
            self.pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(queued);
        }
        entity
    }

    /// Populate one entity if the run needs it and its key has not been populated.
    ///
    /// Returns whether `populate` was invoked.
    pub fn populate_entity(&self, entity: &dyn Entity) -> Result<bool, SrcFactsError> {
        if !entity.needs_population(self) {
            return Ok(false);
        }
        let first = self
            .populated
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entity.key().clone());
        if !first {
            debug!(key = %entity.key(), "key already populated");
            return Ok(false);
        }
        entity.populate(self)?;
        Ok(true)
    }

    /// Populate every entity created so far, including those created while
    /// populating (such as parent folders), until none remain.
    ///
    /// The first error aborts the pass.
    pub fn populate_all(&self) -> Result<PopulationStats, SrcFactsError> {
        let mut stats = PopulationStats::default();
        loop {
            let batch =
                std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner));
            if batch.is_empty() {
                break;
            }
            for entity in batch {
                if self.populate_entity(entity.as_ref())? {
                    stats.populated += 1;
                } else {
                    stats.skipped += 1;
                }
            }
        }

        info!(
            populated = stats.populated,
            skipped = stats.skipped,
            "population pass complete"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compilation::{SourceEncoding, SyntaxUnit};
    use crate::paths::{path_as_database_id, path_as_display_path};
    use crate::sink::MemorySink;
    use crate::types::Relation;
    use tempfile::tempdir;

    #[test]
    fn test_populate_all_covers_files_and_folder_chain() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.cs").to_string_lossy().to_string();
        let sink = Arc::new(MemorySink::new());
        let cx = Context::new(
            ExtractorConfig::default(),
            Compilation::new(vec![SyntaxUnit::new(&path, "x\n", SourceEncoding::Utf8)]),
            sink.clone(),
        );

        File::create(&cx, Some(path.as_str())).unwrap();
        File::create_generated(&cx);
        let stats = cx.populate_all().unwrap();

        // Every ancestor of the temp dir up to the root gets a folders fact
        let depth = path_as_display_path(&dir.path().to_string_lossy())
            .split('/')
            .filter(|s| !s.is_empty())
            .count();
        assert_eq!(sink.of_relation(Relation::Folders).len(), depth + 1);
        assert_eq!(stats.populated, 2 + depth + 1);
        assert_eq!(sink.of_relation(Relation::Files).len(), 2);
        assert_eq!(sink.of_relation(Relation::NumLines).len(), 1);
    }

    #[test]
    fn test_unneeded_files_are_skipped() {
        let sink = Arc::new(MemorySink::new());
        let cx = Context::new(ExtractorConfig::default(), Compilation::default(), sink.clone());

        File::create(&cx, Some("/not/in/compilation.dll")).unwrap();
        let stats = cx.populate_all().unwrap();

        assert_eq!(stats, PopulationStats { populated: 0, skipped: 1 });
        assert!(sink.is_empty());
        // No folder is created for a file that was never populated
        assert_eq!(cx.folder_count(), 0);
    }

    #[test]
    fn test_populate_all_is_idempotent() {
        let sink = Arc::new(MemorySink::new());
        let cx = Context::new(ExtractorConfig::default(), Compilation::default(), sink.clone());

        File::create_generated(&cx);
        cx.populate_all().unwrap();
        let second = cx.populate_all().unwrap();

        assert_eq!(second, PopulationStats::default());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_driver_populates_each_key_once() {
        let sink = Arc::new(MemorySink::new());
        let cx = Context::new(ExtractorConfig::default(), Compilation::default(), sink.clone());

        let generated = File::create_generated(&cx);
        assert!(cx.populate_entity(generated.as_ref()).unwrap());
        assert!(!cx.populate_entity(generated.as_ref()).unwrap());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_failure_aborts_pass() {
        let dir = tempdir().unwrap();
        let path = dir
            .path()
            .join("missing")
            .join("a.cs")
            .to_string_lossy()
            .to_string();
        let sink = Arc::new(MemorySink::new());
        let cx = Context::new(
            ExtractorConfig::default(),
            Compilation::new(vec![SyntaxUnit::new(&path, "x", SourceEncoding::Utf8)]),
            sink.clone(),
        );

        let file = File::create(&cx, Some(path.as_str())).unwrap();
        assert_eq!(file.database_id(), path_as_database_id(&path));
        assert!(matches!(cx.populate_all(), Err(SrcFactsError::Io(_))));
        assert!(sink.is_empty());
    }
}
