use serde::{Deserialize, Serialize};

use super::key::Key;
use crate::line_counter::LineCounts;

/// Whether facts were produced by a standalone run or one integrated into a build.
///
/// Stored as its numeric flag: 1 standalone, 0 integrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum ExtractionMode {
    Integrated,
    Standalone,
}

impl ExtractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMode::Integrated => "integrated",
            ExtractionMode::Standalone => "standalone",
        }
    }

    /// Numeric form stored in the `file_extraction_mode` column
    pub fn as_flag(&self) -> i32 {
        match self {
            ExtractionMode::Integrated => 0,
            ExtractionMode::Standalone => 1,
        }
    }
}

impl From<ExtractionMode> for i32 {
    fn from(mode: ExtractionMode) -> Self {
        mode.as_flag()
    }
}

impl TryFrom<i32> for ExtractionMode {
    type Error = String;

    fn try_from(flag: i32) -> Result<Self, Self::Error> {
        match flag {
            0 => Ok(ExtractionMode::Integrated),
            1 => Ok(ExtractionMode::Standalone),
            other => Err(format!("invalid extraction mode flag {}", other)),
        }
    }
}

/// Relations a tuple can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Files,
    Folders,
    ContainerParent,
    NumLines,
    FileExtractionMode,
}

impl Relation {
    pub const ALL: [Relation; 5] = [
        Relation::Files,
        Relation::Folders,
        Relation::ContainerParent,
        Relation::NumLines,
        Relation::FileExtractionMode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Files => "files",
            Relation::Folders => "folders",
            Relation::ContainerParent => "container_parent",
            Relation::NumLines => "num_lines",
            Relation::FileExtractionMode => "file_extraction_mode",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Relation::ALL.into_iter().find(|r| r.as_str() == s)
    }
}

/// One fact emitted into the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "relation", rename_all = "snake_case")]
pub enum Tuple {
    Files {
        file: Key,
        display_path: String,
        name: String,
        extension: String,
    },
    Folders {
        folder: Key,
        display_path: String,
        name: String,
    },
    ContainerParent {
        parent: Key,
        child: Key,
    },
    NumLines {
        file: Key,
        counts: LineCounts,
    },
    FileExtractionMode {
        file: Key,
        mode: ExtractionMode,
    },
}

impl Tuple {
    pub fn relation(&self) -> Relation {
        match self {
            Tuple::Files { .. } => Relation::Files,
            Tuple::Folders { .. } => Relation::Folders,
            Tuple::ContainerParent { .. } => Relation::ContainerParent,
            Tuple::NumLines { .. } => Relation::NumLines,
            Tuple::FileExtractionMode { .. } => Relation::FileExtractionMode,
        }
    }

    /// The entity this tuple describes (the child for containment)
    pub fn subject(&self) -> &Key {
        match self {
            Tuple::Files { file, .. } => file,
            Tuple::Folders { folder, .. } => folder,
            Tuple::ContainerParent { child, .. } => child,
            Tuple::NumLines { file, .. } => file,
            Tuple::FileExtractionMode { file, .. } => file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_names_roundtrip() {
        for relation in Relation::ALL {
            assert_eq!(Relation::from_str(relation.as_str()), Some(relation));
        }
        assert_eq!(Relation::from_str("symbols"), None);
    }

    #[test]
    fn test_tuple_json_is_tagged_by_relation() {
        let tuple = Tuple::FileExtractionMode {
            file: Key::source_file("/a.cs"),
            mode: ExtractionMode::Standalone,
        };
        let json = serde_json::to_value(&tuple).unwrap();
        assert_eq!(json["relation"], "file_extraction_mode");
        assert_eq!(json["mode"], 1);
        assert_eq!(json["file"], "/a.cs;sourcefile");
    }

    #[test]
    fn test_extraction_mode_flag() {
        assert_eq!(ExtractionMode::Standalone.as_flag(), 1);
        assert_eq!(ExtractionMode::Integrated.as_flag(), 0);
    }

    #[test]
    fn test_stored_mode_reads_back_from_flag() {
        let json = r#"{"relation":"file_extraction_mode","file":"/a.cs;sourcefile","mode":0}"#;
        let tuple: Tuple = serde_json::from_str(json).unwrap();
        assert_eq!(
            tuple,
            Tuple::FileExtractionMode {
                file: Key::source_file("/a.cs"),
                mode: ExtractionMode::Integrated,
            }
        );

        let bad = r#"{"relation":"file_extraction_mode","file":"/a.cs;sourcefile","mode":7}"#;
        assert!(serde_json::from_str::<Tuple>(bad).is_err());
    }

    #[test]
    fn test_subject_of_containment_is_child() {
        let tuple = Tuple::ContainerParent {
            parent: Key::folder("/src"),
            child: Key::source_file("/src/a.cs"),
        };
        assert_eq!(tuple.subject(), &Key::source_file("/src/a.cs"));
        assert_eq!(tuple.relation(), Relation::ContainerParent);
    }
}
