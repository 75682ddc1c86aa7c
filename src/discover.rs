//! Input discovery: validate the root directory and collect `.doc` exports.
//!
//! Discovery is the only place where a missing or wrong root is fatal; once
//! the file list exists, every later failure is per-file.

use crate::error::Doc2MdError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File-name suffix of a Confluence export.
pub const DOC_SUFFIX: &str = ".doc";

/// Check that `root` exists and is a directory.
pub fn validate_root(root: &Path) -> Result<(), Doc2MdError> {
    if !root.exists() {
        return Err(Doc2MdError::RootNotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(Doc2MdError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    Ok(())
}

/// Recursively find every regular file under `root` whose name ends with
/// `.doc` (case-sensitive).
///
/// Entries are visited in file-name order so the result is deterministic.
/// Unreadable subdirectories are logged and skipped.
pub fn find_doc_files(root: &Path) -> Result<Vec<PathBuf>, Doc2MdError> {
    validate_root(root)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if entry.file_type().is_file() && entry.file_name().to_string_lossy().ends_with(DOC_SUFFIX) {
            files.push(entry.into_path());
        }
    }

    debug!("Found {} .doc file(s) under {}", files.len(), root.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_root_is_fatal() {
        let err = find_doc_files(Path::new("/definitely/not/here/12345")).unwrap_err();
        assert!(matches!(err, Doc2MdError::RootNotFound { .. }));
    }

    #[test]
    fn test_file_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("page.doc");
        fs::write(&file, "x").unwrap();
        let err = find_doc_files(&file).unwrap_err();
        assert!(matches!(err, Doc2MdError::NotADirectory { .. }));
    }

    #[test]
    fn test_recursive_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("space/sub")).unwrap();
        fs::write(root.join("b.doc"), "").unwrap();
        fs::write(root.join("a.doc"), "").unwrap();
        fs::write(root.join("space/sub/c.doc"), "").unwrap();
        fs::write(root.join("notes.docx"), "").unwrap();
        fs::write(root.join("UPPER.DOC"), "").unwrap();
        fs::write(root.join("readme.md"), "").unwrap();
        fs::create_dir(root.join("folder.doc")).unwrap();

        let found: Vec<PathBuf> = find_doc_files(root)
            .unwrap()
            .into_iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            found,
            vec![
                PathBuf::from("a.doc"),
                PathBuf::from("b.doc"),
                PathBuf::from("space/sub/c.doc"),
            ]
        );
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_doc_files(dir.path()).unwrap().is_empty());
    }
}
