use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use libsrcfacts_core::paths::split_extension;
use libsrcfacts_core::{
    load_config, Compilation, Context, ExtractorConfig, FactStore, File, SrcFactsError,
    SyntaxUnit,
};

use crate::cli::Cli;
use crate::output::report;

pub struct ExtractArgs {
    pub db: PathBuf,
    pub config: Option<PathBuf>,
    pub archive: Option<PathBuf>,
    pub standalone: bool,
    pub integrated: bool,
    pub output: Option<String>,
    pub pattern: Option<String>,
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ExtractSummary {
    db: String,
    mode: &'static str,
    files: usize,
    source_units: usize,
    folders: usize,
    populated: usize,
    skipped: usize,
}

pub fn run(cli: &Cli, args: ExtractArgs) -> Result<(), SrcFactsError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ExtractorConfig::default(),
    };
    if args.standalone {
        config.standalone = true;
    } else if args.integrated {
        config.standalone = false;
    }
    if let Some(output) = &args.output {
        config.output_path = Some(path_string(&absolute(Path::new(output))?));
    }
    if let Some(archive) = &args.archive {
        config.archive_dir = Some(absolute(archive)?);
    }

    let pattern = args
        .pattern
        .as_deref()
        .map(glob::Pattern::new)
        .transpose()
        .map_err(|e| SrcFactsError::InvalidArgs(format!("Invalid glob pattern: {}", e)))?;

    let db = absolute(&args.db)?;
    let mut excluded = vec![db.clone(), db.with_extension("lock")];
    excluded.extend(config.archive_dir.iter().cloned());

    let files = collect_files(&args.paths, pattern.as_ref(), &excluded)?;

    let mut compilation = Compilation::default();
    for file in &files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (_, extension) = split_extension(&name);
        if config.is_source_extension(extension) {
            let bytes = std::fs::read(file)?;
            compilation.push(SyntaxUnit::from_bytes(path_string(file), &bytes));
        }
    }
    debug!(files = files.len(), units = compilation.len(), "collected inputs");

    let mode = config.extraction_mode().as_str();
    let store = Arc::new(FactStore::open_locked(&db)?);
    let cx = Context::new(config, compilation, store.clone());

    for file in &files {
        File::create(&cx, Some(path_string(file).as_str()))?;
    }
    if let Some(output) = cx.config().output_path.clone() {
        File::create(&cx, Some(output.as_str()))?;
    }
    File::create_generated(&cx);

    let stats = cx.populate_all()?;
    store.flush()?;

    let summary = ExtractSummary {
        db: path_string(&db),
        mode,
        files: cx.file_count(),
        source_units: cx.compilation().len(),
        folders: cx.folder_count(),
        populated: stats.populated,
        skipped: stats.skipped,
    };
    info!(?summary, "extraction complete");

    report(cli, &summary, |s| {
        vec![format!(
            "Extracted {} files ({} source units, {} folders) into {}",
            s.files, s.source_units, s.folders, s.db
        )]
    })
}

/// Files under `roots`, sorted, skipping excluded paths.
///
/// Symlinks are not followed, so each physical file is reached by one path.
fn collect_files(
    roots: &[PathBuf],
    pattern: Option<&glob::Pattern>,
    excluded: &[PathBuf],
) -> Result<Vec<PathBuf>, SrcFactsError> {
    let mut files = Vec::new();
    for root in roots {
        let root = std::fs::canonicalize(root).map_err(|e| {
            SrcFactsError::NotFound(format!("{}: {}", root.display(), e))
        })?;

        let walker = WalkDir::new(&root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !excluded.iter().any(|e| entry.path().starts_with(e)));

        for entry in walker {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let matches = pattern
                .map(|p| p.matches(&entry.file_name().to_string_lossy()))
                .unwrap_or(true);
            if matches {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn absolute(path: &Path) -> Result<PathBuf, SrcFactsError> {
    if path.exists() {
        return Ok(std::fs::canonicalize(path)?);
    }
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
