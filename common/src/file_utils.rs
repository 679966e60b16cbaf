//! File utility functions for listing and filtering files.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Returns true if `path` has one of `extensions`, compared case-insensitively.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

/// Returns paths to all files under `dir`, recursively, matching the given extensions.
///
/// Entries are visited in lexicographic file-name order at every directory level,
/// so the same tree always yields the same sequence.
pub fn files_with_extensions_recursive(
    dir: &Path,
    extensions: &[&str],
) -> walkdir::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }

    log::debug!(
        "Found {} files matching {:?} under {}",
        files.len(),
        extensions,
        dir.display()
    );
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recursive_scan_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir(root.join("b_sub")).unwrap();
        for name in ["c.tif", "a.TIFF", "notes.txt", "b_sub/z.tif", "b_sub/a.tif"] {
            std::fs::write(root.join(name), b"x").unwrap();
        }

        let files = files_with_extensions_recursive(root, &["tif", "tiff"]).unwrap();
        let relative: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            relative,
            vec![
                PathBuf::from("a.TIFF"),
                PathBuf::from("b_sub/a.tif"),
                PathBuf::from("b_sub/z.tif"),
                PathBuf::from("c.tif"),
            ]
        );
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(files_with_extensions_recursive(&dir.path().join("nope"), &["tif"]).is_err());
    }
}
