use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SrcFactsError;
use crate::types::ExtractionMode;

/// Run-level extractor configuration, usually stored as `srcfacts.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Standalone run (true) or integrated into a build (false)
    pub standalone: bool,
    /// The single output artifact of the build, which always gets a `files` fact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    /// Extensions (without dot) whose files are line-counted and archived
    pub source_extensions: Vec<String>,
    /// Root directory of the source archive; archiving is off when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_dir: Option<PathBuf>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            standalone: true,
            output_path: None,
            source_extensions: vec!["cs".to_string()],
            archive_dir: None,
        }
    }
}

impl ExtractorConfig {
    /// Whether a file with this extension comes from source rather than elsewhere
    pub fn is_source_extension(&self, extension: &str) -> bool {
        !extension.is_empty()
            && self
                .source_extensions
                .iter()
                .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }

    pub fn extraction_mode(&self) -> ExtractionMode {
        if self.standalone {
            ExtractionMode::Standalone
        } else {
            ExtractionMode::Integrated
        }
    }
}

/// Load extractor config from a TOML file
pub fn load_config(path: &Path) -> Result<ExtractorConfig, SrcFactsError> {
    if !path.exists() {
        return Err(SrcFactsError::NotFound(format!(
            "Config not found: {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    let config: ExtractorConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save extractor config to a TOML file
pub fn save_config(path: &Path, config: &ExtractorConfig) -> Result<(), SrcFactsError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
