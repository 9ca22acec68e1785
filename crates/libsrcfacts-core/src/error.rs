use thiserror::Error;

/// Main error type for srcfacts operations
#[derive(Debug, Error)]
pub enum SrcFactsError {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("database busy: {0}")]
    DbBusy(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl SrcFactsError {
    /// Get the error code for JSON output
    pub fn error_code(&self) -> &'static str {
        match self {
            SrcFactsError::InvalidPath(_) => "invalid_path",
            SrcFactsError::InvalidArgs(_) => "invalid_args",
            SrcFactsError::NotFound(_) => "not_found",
            SrcFactsError::DbBusy(_) => "db_busy",
            SrcFactsError::Io(_) => "io_error",
            SrcFactsError::Sled(_) => "db_error",
            SrcFactsError::Json(_) => "internal_error",
            SrcFactsError::TomlParse(_) => "invalid_args",
            SrcFactsError::TomlSerialize(_) => "internal_error",
        }
    }

    /// Get the exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            SrcFactsError::InvalidPath(_) => 2,
            SrcFactsError::InvalidArgs(_) => 2,
            SrcFactsError::TomlParse(_) => 2,
            SrcFactsError::NotFound(_) => 3,
            SrcFactsError::DbBusy(_) => 5,
            SrcFactsError::Io(_) => 5,
            SrcFactsError::Sled(_) => 5,
            _ => 1,
        }
    }

    /// Get actionable suggestions for fixing the error
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            SrcFactsError::InvalidPath(_) => vec![
                "Pass absolute paths, or run from the directory you want to extract",
            ],
            SrcFactsError::DbBusy(_) => vec![
                "Another extraction is writing to this database; wait for it to finish",
                "Or pass a different --db directory",
            ],
            SrcFactsError::Sled(_) => vec![
                "Delete the --db directory and re-run the extraction",
                "If problem persists, check disk space and permissions",
            ],
            SrcFactsError::Io(_) => vec![
                "Extraction assumes a stable snapshot; make sure no files moved during the run",
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_path_maps_to_usage_exit() {
        let err = SrcFactsError::InvalidPath("relative/file.cs".to_string());
        assert_eq!(err.error_code(), "invalid_path");
        assert_eq!(err.exit_code(), 2);
        assert!(!err.suggestions().is_empty());
    }

    #[test]
    fn test_busy_database_is_retryable_failure() {
        let err = SrcFactsError::DbBusy("held by pid 42".to_string());
        assert_eq!(err.error_code(), "db_busy");
        assert_eq!(err.exit_code(), 5);
        assert_eq!(err.suggestions().len(), 2);
    }
}
