use std::fmt;

use serde::{Deserialize, Serialize};

/// External key of the generated pseudo-file (and of a file created without a path).
///
/// Real file keys start with a database ID, which is always derived from an
/// absolute path, so they begin with `/` or a `X_` drive prefix and can never
/// equal this constant.
pub const GENERATED_FILE_KEY: &str = "GENERATED;sourcefile";

const SOURCE_FILE_SUFFIX: &str = ";sourcefile";
const FOLDER_SUFFIX: &str = ";folder";

/// Stable identity of an entity in the fact database.
///
/// Facts reference entities by key, so downstream consumers never need to
/// re-derive a path to refer to a file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    /// Key of a real source file with the given database ID
    pub fn source_file(database_id: &str) -> Self {
        Key(format!("{}{}", database_id, SOURCE_FILE_SUFFIX))
    }

    pub fn generated_file() -> Self {
        Key(GENERATED_FILE_KEY.to_string())
    }

    /// Key of a folder with the given database ID
    pub fn folder(database_id: &str) -> Self {
        Key(format!("{}{}", database_id, FOLDER_SUFFIX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_generated(&self) -> bool {
        self.0 == GENERATED_FILE_KEY
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<[u8]> for Key {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}
