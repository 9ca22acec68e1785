use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use super::{Entity, Folder};
use crate::context::Context;
use crate::error::SrcFactsError;
use crate::line_counter::compute_line_counts;
use crate::paths::{
    ensure_absolute, path_as_database_id, path_as_display_path, split_extension, split_parent,
};
use crate::types::{Key, Tuple};

/// Where a file entity comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOrigin {
    /// A real file at an absolute path
    Path(String),
    /// Created without a path; described by an empty `files` fact only
    NoPath,
    /// The run-wide pseudo-file for generated code
    Generated,
}

/// A source file, or the generated pseudo-file
#[derive(Debug)]
pub struct File {
    origin: FileOrigin,
    database_id: String,
    key: Key,
    populated: AtomicBool,
}

impl File {
    fn new(origin: FileOrigin, database_id: String) -> Self {
        let key = match origin {
            FileOrigin::Path(_) => Key::source_file(&database_id),
            // A path-less file denotes the same database entity as the generated one
            FileOrigin::NoPath | FileOrigin::Generated => Key::generated_file(),
        };
        Self {
            origin,
            database_id,
            key,
            populated: AtomicBool::new(false),
        }
    }

    /// Get the file entity for `path`, creating it on first request.
    ///
    /// Paths with the same database ID share one entity. `None` or an empty
    /// path yields the path-less entity. A non-empty relative path has no
    /// stable identity and is rejected.
    pub fn create(cx: &Context, path: Option<&str>) -> Result<Arc<File>, SrcFactsError> {
        let path = path.filter(|p| !p.is_empty());
        let database_id = match path {
            Some(p) => {
                ensure_absolute(p)?;
                Some(path_as_database_id(p))
            }
            None => None,
        };

        Ok(cx.intern(&cx.caches.files, database_id.clone(), || match path {
            Some(p) => File::new(FileOrigin::Path(p.to_string()), database_id.unwrap_or_default()),
            None => File::new(FileOrigin::NoPath, String::new()),
        }))
    }

    /// Get the generated pseudo-file; there is one per context.
    pub fn create_generated(cx: &Context) -> Arc<File> {
        cx.intern(&cx.caches.generated, (), || {
            File::new(FileOrigin::Generated, String::new())
        })
    }

    pub fn origin(&self) -> &FileOrigin {
        &self.origin
    }

    /// The path this entity was first requested with
    pub fn path(&self) -> Option<&str> {
        match &self.origin {
            FileOrigin::Path(p) => Some(p),
            FileOrigin::NoPath | FileOrigin::Generated => None,
        }
    }

    /// Canonical database ID; empty for path-less and generated files
    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    pub fn is_generated(&self) -> bool {
        self.origin == FileOrigin::Generated
    }

    pub fn is_populated(&self) -> bool {
        self.populated.load(Ordering::Acquire)
    }

    fn is_output_artifact(&self, cx: &Context) -> bool {
        cx.config()
            .output_path
            .as_deref()
            .is_some_and(|out| path_as_database_id(out) == self.database_id)
    }

    fn empty_files_tuple(&self) -> Tuple {
        Tuple::Files {
            file: self.key.clone(),
            display_path: String::new(),
            name: String::new(),
            extension: String::new(),
        }
    }

    fn stage_path_facts(&self, cx: &Context, path: &str) -> Result<Vec<Tuple>, SrcFactsError> {
        let display_path = path_as_display_path(path);
        let (directory, leaf) = split_parent(&display_path)
            .ok_or_else(|| SrcFactsError::InvalidPath(format!("'{}' has no file name", path)))?;
        let (name, extension) = split_extension(leaf);
        let from_source = cx.config().is_source_extension(extension);

        // Facts about a file whose directory cannot be inspected cannot be emitted
        std::fs::metadata(directory).map_err(|e| {
            SrcFactsError::Io(std::io::Error::new(
                e.kind(),
                format!("cannot read directory '{}' of '{}': {}", directory, path, e),
            ))
        })?;

        let folder = Folder::create(cx, directory)?;

        let mut tuples = vec![
            Tuple::Files {
                file: self.key.clone(),
                display_path: display_path.clone(),
                name: name.to_string(),
                extension: extension.to_string(),
            },
            Tuple::ContainerParent {
                parent: folder.key().clone(),
                child: self.key.clone(),
            },
        ];

        if from_source {
            for unit in cx.compilation().units_for(&self.database_id) {
                let mut counts = compute_line_counts(&unit.text);
                // Count an unterminated final line
                if !unit.text.is_empty() && !unit.text.ends_with('\n') {
                    counts.total += 1;
                }
                tuples.push(Tuple::NumLines {
                    file: self.key.clone(),
                    counts,
                });
            }
        }

        tuples.push(Tuple::FileExtractionMode {
            file: self.key.clone(),
            mode: cx.config().extraction_mode(),
        });

        Ok(tuples)
    }

    /// Copy the file's source text into the archive, if one is configured.
    fn archive_sources(&self, cx: &Context, path: &str) -> Result<(), SrcFactsError> {
        let Some(archive) = cx.archive() else {
            return Ok(());
        };
        let leaf = split_parent(&path_as_display_path(path))
            .map(|(_, leaf)| leaf.to_string())
            .unwrap_or_default();
        if !cx.config().is_source_extension(split_extension(&leaf).1) {
            return Ok(());
        }
        for unit in cx.compilation().units_for(&self.database_id) {
            archive.archive(path, &unit.text, unit.encoding)?;
        }
        Ok(())
    }
}

impl Entity for File {
    fn key(&self) -> &Key {
        &self.key
    }

    fn needs_population(&self, cx: &Context) -> bool {
        match &self.origin {
            FileOrigin::Generated => true,
            FileOrigin::NoPath => false,
            FileOrigin::Path(path) => {
                cx.compilation().defines_file(path) || self.is_output_artifact(cx)
            }
        }
    }

    fn populate(&self, cx: &Context) -> Result<(), SrcFactsError> {
        if self.populated.swap(true, Ordering::AcqRel) {
            debug!(key = %self.key, "file already populated, skipping");
            return Ok(());
        }

        let tuples = match &self.origin {
            FileOrigin::Path(path) => self.stage_path_facts(cx, path)?,
            FileOrigin::NoPath | FileOrigin::Generated => vec![self.empty_files_tuple()],
        };

        debug!(key = %self.key, facts = tuples.len(), "populated file");
        cx.emit_all(tuples)?;

        // Archived text always has facts behind it
        if let FileOrigin::Path(path) = &self.origin {
            self.archive_sources(cx, path)?;
        }
        Ok(())
    }
}
