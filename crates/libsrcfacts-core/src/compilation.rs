//! The compilation handed to the extractor by the front-end
//!
//! Only what file population consumes is modelled: each syntax unit's
//! originating path and its text with the encoding it was decoded from.

use std::collections::HashMap;

use crate::paths::path_as_database_id;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Encoding detected when the source text was read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceEncoding {
    #[default]
    Utf8,
    /// UTF-8 with a leading byte order mark
    Utf8Bom,
}

impl SourceEncoding {
    /// Bytes to write before the text to reproduce the original file
    pub fn preamble(&self) -> &'static [u8] {
        match self {
            SourceEncoding::Utf8 => &[],
            SourceEncoding::Utf8Bom => UTF8_BOM,
        }
    }
}

/// One syntax tree's source text
#[derive(Debug, Clone)]
pub struct SyntaxUnit {
    pub path: String,
    pub text: String,
    pub encoding: SourceEncoding,
}

impl SyntaxUnit {
    pub fn new(path: impl Into<String>, text: impl Into<String>, encoding: SourceEncoding) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            encoding,
        }
    }

    /// Decode raw file bytes, detecting a UTF-8 BOM.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    pub fn from_bytes(path: impl Into<String>, bytes: &[u8]) -> Self {
        let (encoding, body) = match bytes.strip_prefix(UTF8_BOM) {
            Some(rest) => (SourceEncoding::Utf8Bom, rest),
            None => (SourceEncoding::Utf8, bytes),
        };
        Self::new(path, String::from_utf8_lossy(body).into_owned(), encoding)
    }
}

/// All syntax units of the program being extracted, indexed by database ID
#[derive(Debug, Default)]
pub struct Compilation {
    units: Vec<SyntaxUnit>,
    by_database_id: HashMap<String, Vec<usize>>,
}

impl Compilation {
    pub fn new(units: Vec<SyntaxUnit>) -> Self {
        let mut compilation = Self::default();
        for unit in units {
            compilation.push(unit);
        }
        compilation
    }

    pub fn push(&mut self, unit: SyntaxUnit) {
        let id = path_as_database_id(&unit.path);
        self.by_database_id.entry(id).or_default().push(self.units.len());
        self.units.push(unit);
    }

    /// Whether any syntax unit was read from this file
    pub fn defines_file(&self, path: &str) -> bool {
        self.by_database_id.contains_key(&path_as_database_id(path))
    }

    /// Syntax units whose path canonicalizes to `database_id`, in insertion order
    pub fn units_for(&self, database_id: &str) -> impl Iterator<Item = &SyntaxUnit> {
        self.by_database_id
            .get(database_id)
            .into_iter()
            .flatten()
            .map(|&idx| &self.units[idx])
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
