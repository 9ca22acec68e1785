use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use crate::compilation::SourceEncoding;
use crate::error::SrcFactsError;
use crate::paths::path_as_archive_relative;

/// Source archive rooted at a directory.
///
/// Each file lands at `<root>/<database id without leading slash>`, so
/// `c:\src\a.cs` is stored as `<root>/C_/src/a.cs`.
#[derive(Debug, Clone)]
pub struct SourceArchive {
    root: PathBuf,
}

impl SourceArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Where `path` is stored inside the archive
    pub fn archived_path(&self, path: &str) -> PathBuf {
        self.root.join(path_as_archive_relative(path))
    }

    /// Persist `text` for `path` in its original encoding.
    pub fn archive(
        &self,
        path: &str,
        text: &str,
        encoding: SourceEncoding,
    ) -> Result<PathBuf, SrcFactsError> {
        let target = self.archived_path(path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::File::create(&target)?;
        file.write_all(encoding.preamble())?;
        file.write_all(text.as_bytes())?;
        file.flush()?;

        debug!(source = path, archived = %target.display(), "archived source text");
        Ok(target)
    }
}
