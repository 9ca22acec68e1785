use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use super::Entity;
use crate::context::Context;
use crate::error::SrcFactsError;
use crate::paths::{ensure_absolute, path_as_database_id, path_as_display_path, split_parent};
use crate::types::{Key, Tuple};

/// A directory containing files or other folders
#[derive(Debug)]
pub struct Folder {
    display_path: String,
    key: Key,
    populated: AtomicBool,
}

impl Folder {
    /// Get the folder entity for an absolute directory path, creating it on first request.
    pub fn create(cx: &Context, path: &str) -> Result<Arc<Folder>, SrcFactsError> {
        ensure_absolute(path)?;
        let display_path = normalize_directory(&path_as_display_path(path));
        let database_id = path_as_database_id(&display_path);

        Ok(cx.intern(&cx.caches.folders, database_id.clone(), || Folder {
            key: Key::folder(&database_id),
            display_path,
            populated: AtomicBool::new(false),
        }))
    }

    pub fn display_path(&self) -> &str {
        &self.display_path
    }

    /// Leaf name, or the whole path for a root
    pub fn name(&self) -> &str {
        split_parent(&self.display_path)
            .map(|(_, leaf)| leaf)
            .unwrap_or(&self.display_path)
    }
}

impl Entity for Folder {
    fn key(&self) -> &Key {
        &self.key
    }

    fn needs_population(&self, _cx: &Context) -> bool {
        true
    }

    fn populate(&self, cx: &Context) -> Result<(), SrcFactsError> {
        if self.populated.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let mut tuples = vec![Tuple::Folders {
            folder: self.key.clone(),
            display_path: self.display_path.clone(),
            name: self.name().to_string(),
        }];

        if let Some((parent, _)) = split_parent(&self.display_path) {
            let parent = Folder::create(cx, parent)?;
            tuples.push(Tuple::ContainerParent {
                parent: parent.key().clone(),
                child: self.key.clone(),
            });
        }

        debug!(key = %self.key, "populated folder");
        cx.emit_all(tuples)
    }
}

/// Drop trailing separators except the one that makes a root (`/`, `C:/`)
fn normalize_directory(display_path: &str) -> String {
    let trimmed = display_path.trim_end_matches('/');
    if trimmed.is_empty() || trimmed.ends_with(':') {
        format!("{}/", trimmed)
    } else {
        trimmed.to_string()
    }
}
