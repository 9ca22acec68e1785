//! Path canonicalization for database identifiers
//!
//! Extraction may run over Windows or Unix snapshots, so paths are handled as
//! strings with both separator styles rather than through `std::path`, whose
//! parsing depends on the host platform.

use crate::error::SrcFactsError;

/// Convert an absolute path into the string used as its ID in the fact database.
///
/// `c:\src\a.cs` and `C:/src/a.cs` both become `C_/src/a.cs`. Any other colon is
/// replaced so the ID never contains the key separator of the target store.
pub fn path_as_database_id(path: &str) -> String {
    let mut id = String::with_capacity(path.len());
    let mut rest = path;
    if let Some(drive) = drive_letter(path) {
        id.push(drive.to_ascii_uppercase());
        id.push('_');
        rest = &path[2..];
    }
    for c in rest.chars() {
        match c {
            '\\' => id.push('/'),
            ':' => id.push('_'),
            other => id.push(other),
        }
    }
    id
}

/// Convert a path into the human readable form stored in `files` and `folders`.
///
/// Only separators are normalized; this is not a unique key.
pub fn path_as_display_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Location of a path inside the source archive, relative to the archive root.
pub fn path_as_archive_relative(path: &str) -> String {
    path_as_database_id(path).trim_start_matches('/').to_string()
}

/// Whether the path is absolute in either Unix or Windows form.
pub fn is_absolute(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with('\\') {
        return true;
    }
    drive_letter(path).is_some() && matches!(path.as_bytes().get(2), Some(b'/') | Some(b'\\'))
}

/// Reject paths that cannot be given a stable identifier.
pub fn ensure_absolute(path: &str) -> Result<(), SrcFactsError> {
    if is_absolute(path) {
        Ok(())
    } else {
        Err(SrcFactsError::InvalidPath(format!(
            "'{}' is not an absolute path",
            path
        )))
    }
}

/// Split a display path into its parent directory and leaf name.
///
/// Returns `None` for roots (`/`, `C:/`), which have no parent.
pub fn split_parent(display_path: &str) -> Option<(&str, &str)> {
    let trimmed = trim_trailing_separator(display_path);
    let idx = trimmed.rfind('/')?;
    let leaf = &trimmed[idx + 1..];
    if leaf.is_empty() {
        return None;
    }
    // Keep the separator on roots so "/a" has parent "/" and "C:/a" has "C:/".
    let parent = if trimmed[..idx].is_empty() || trimmed[..idx].ends_with(':') {
        &trimmed[..idx + 1]
    } else {
        &trimmed[..idx]
    };
    Some((parent, leaf))
}

/// Split a leaf name on its final dot into `(name, extension)`.
///
/// The extension excludes the dot. A trailing dot yields an empty extension and
/// leaves the leaf untouched.
pub fn split_extension(leaf: &str) -> (&str, &str) {
    match leaf.rfind('.') {
        Some(idx) if idx + 1 < leaf.len() => (&leaf[..idx], &leaf[idx + 1..]),
        _ => (leaf, ""),
    }
}

fn trim_trailing_separator(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() || trimmed.ends_with(':') {
        // "/" and "C:/" are roots; leave them intact
        &path[..(trimmed.len() + 1).min(path.len())]
    } else {
        trimmed
    }
}

fn drive_letter(path: &str) -> Option<char> {
    let mut chars = path.chars();
    let first = chars.next()?;
    if first.is_ascii_alphabetic() && chars.next() == Some(':') {
        Some(first)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_drive_letter_is_folded() {
        assert_eq!(path_as_database_id("c:\\a\\b.cs"), "C_/a/b.cs");
    }

    #[test]
    fn test_uppercase_drive_letter_matches_lowercase() {
        assert_eq!(
            path_as_database_id("C:\\a\\b.cs"),
            path_as_database_id("c:/a/b.cs")
        );
    }

    #[test]
    fn test_database_id_has_no_backslash_or_colon() {
        let id = path_as_database_id("d:\\weird:name\\x.cs");
        assert!(!id.contains('\\'));
        assert!(!id.contains(':'));
        assert_eq!(id, "D_/weird_name/x.cs");
    }

    #[test]
    fn test_unix_path_is_unchanged() {
        assert_eq!(path_as_database_id("/home/u/Program.cs"), "/home/u/Program.cs");
    }

    #[test]
    fn test_empty_path() {
        assert_eq!(path_as_database_id(""), "");
        assert_eq!(path_as_display_path(""), "");
    }

    #[test]
    fn test_database_id_is_deterministic() {
        let p = "e:\\proj\\src\\Main.cs";
        assert_eq!(path_as_database_id(p), path_as_database_id(p));
    }

    #[test]
    fn test_display_path_keeps_drive_colon() {
        assert_eq!(path_as_display_path("c:\\a\\b.cs"), "c:/a/b.cs");
    }

    #[test]
    fn test_archive_relative() {
        assert_eq!(path_as_archive_relative("/src/a.cs"), "src/a.cs");
        assert_eq!(path_as_archive_relative("c:\\src\\a.cs"), "C_/src/a.cs");
    }

    #[test]
    fn test_is_absolute() {
        assert!(is_absolute("/a/b"));
        assert!(is_absolute("C:\\a"));
        assert!(is_absolute("c:/a"));
        assert!(is_absolute("\\\\server\\share"));
        assert!(!is_absolute("a/b"));
        assert!(!is_absolute("C:a"));
        assert!(!is_absolute("GENERATED"));
        assert!(!is_absolute(""));
    }

    #[test]
    fn test_ensure_absolute_rejects_relative() {
        let err = ensure_absolute("src/a.cs").unwrap_err();
        assert!(matches!(err, SrcFactsError::InvalidPath(_)));
    }

    #[test]
    fn test_split_parent() {
        assert_eq!(split_parent("/a/b.cs"), Some(("/a", "b.cs")));
        assert_eq!(split_parent("/b.cs"), Some(("/", "b.cs")));
        assert_eq!(split_parent("C:/a"), Some(("C:/", "a")));
        assert_eq!(split_parent("/a/dir/"), Some(("/a", "dir")));
        assert_eq!(split_parent("/"), None);
        assert_eq!(split_parent("C:/"), None);
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("Program.cs"), ("Program", "cs"));
        assert_eq!(split_extension("README"), ("README", ""));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", "gz"));
        assert_eq!(split_extension(".editorconfig"), ("", "editorconfig"));
        assert_eq!(split_extension("trailing."), ("trailing.", ""));
    }
}
